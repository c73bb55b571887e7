// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Navigation history
//!
//! Two views over the same session: an append-only log of every URL that
//! was successfully opened (in request order), and a back/forward stack
//! mirroring browser navigation buttons.

use url::Url;

use crate::error::{Error, Result};

/// Session navigation history
#[derive(Debug, Clone, Default)]
pub struct BrowserHistory {
    back: Vec<Url>,
    forward: Vec<Url>,
    visited: Vec<Url>,
}

impl BrowserHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful navigation
    ///
    /// Re-opening the current location (a refresh) does not disturb the
    /// forward stack; any other navigation clears it.
    pub fn record(&mut self, url: Url) {
        self.visited.push(url.clone());
        if self.back.last() != Some(&url) {
            self.back.push(url);
            self.forward.clear();
        }
    }

    /// The current location, if any navigation has happened
    pub fn current(&self) -> Option<&Url> {
        self.back.last()
    }

    /// Move back up to `n` entries, returning the new current location
    pub fn back(&mut self, n: usize) -> Result<Url> {
        if self.back.is_empty() {
            return Err(Error::History("no history to go back to".to_string()));
        }
        for _ in 0..n.min(self.back.len() - 1) {
            if let Some(url) = self.back.pop() {
                self.forward.insert(0, url);
            }
        }
        // The oldest entry is never popped, so back stays non-empty
        self.back
            .last()
            .cloned()
            .ok_or_else(|| Error::History("no history to go back to".to_string()))
    }

    /// Move forward up to `n` entries, returning the new current location
    pub fn forward(&mut self, n: usize) -> Result<Url> {
        if self.back.is_empty() && self.forward.is_empty() {
            return Err(Error::History("no history to go forward to".to_string()));
        }
        for _ in 0..n.min(self.forward.len()) {
            self.back.push(self.forward.remove(0));
        }
        self.back
            .last()
            .cloned()
            .ok_or_else(|| Error::History("no current location".to_string()))
    }

    /// Every successfully opened URL, in request order
    pub fn visited(&self) -> &[Url] {
        &self.visited
    }

    /// Number of entries reachable via back (current location included)
    pub fn len(&self) -> usize {
        self.back.len()
    }

    /// Check whether any navigation has been recorded
    pub fn is_empty(&self) -> bool {
        self.back.is_empty() && self.forward.is_empty()
    }
}
