// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP collaborator layer for the Mustekala client
//!
//! Wraps reqwest with our own cookie jar and a pluggable response cache.
//! The browsing core above only sees [`Request`] in and [`Response`] out.

mod cache;
mod client;
mod cookie;
mod request;
mod response;

pub use cache::{cache_key, CachedResponse, HttpCache, MemoryCache};
pub use client::{HttpClient, HttpClientConfig};
pub use cookie::{Cookie, CookieJar, SameSite};
pub use request::{CacheMode, Request};
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
