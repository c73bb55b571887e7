// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Pluggable response cache
//!
//! The client consults the cache before sending a request and stores
//! cacheable responses after. A miss is a cache-absent signal, never an
//! error.

use std::fmt;

use bytes::Bytes;
use dashmap::DashMap;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use url::Url;

/// A stored response, ready to be replayed as a cache hit
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL of the original response
    pub url: Url,
}

/// Key-value store interface for cached responses
pub trait HttpCache: Send + Sync + fmt::Debug {
    /// Look up a cached response
    fn get(&self, key: &str) -> Option<CachedResponse>;

    /// Store a response
    fn put(&self, key: String, entry: CachedResponse);

    /// Drop all entries
    fn clear(&self);
}

/// Build the cache key for a request
pub fn cache_key(method: &Method, url: &Url) -> String {
    format!("{} {}", method, url)
}

/// In-memory cache backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CachedResponse>,
}

impl MemoryCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HttpCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CachedResponse> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    fn put(&self, key: String, entry: CachedResponse) {
        self.entries.insert(key, entry);
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
