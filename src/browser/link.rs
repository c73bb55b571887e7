// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Link extraction

use std::collections::HashSet;

use url::Url;

use crate::dom::Document;

/// A navigable link derived from an `<a>` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute target URL (fragment stripped)
    pub href: Url,
    /// Link text, trimmed
    pub text: String,
}

/// Extract all links from a document, resolved against the page URL
///
/// Fragment-only jumps collapse onto the page URL itself, duplicates are
/// removed keeping the first occurrence, and unparsable hrefs are skipped.
pub(crate) fn extract_links(doc: &Document, base: &Url) -> Vec<Link> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for a in doc.find_all("a") {
        let Some(href) = a.attr("href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        let Ok(mut url) = base.join(href) else {
            continue;
        };
        url.set_fragment(None);

        if seen.insert(url.to_string()) {
            links.push(Link {
                href: url,
                text: a.text().trim().to_string(),
            });
        }
    }

    links
}
