// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Mustekala
//!
//! A stateful browsing client for page-oriented automation: open pages,
//! follow links, fill and submit forms, and read tables, with cookies,
//! history, caching, and retries handled by the session.
//!
//! ## Example
//!
//! ```no_run
//! use mustekala::Session;
//!
//! #[tokio::main]
//! async fn main() -> mustekala::Result<()> {
//!     let session = Session::new()?;
//!     let page = session.open("https://example.com/login").await?;
//!
//!     let mut form = page.get_form()?;
//!     form.fill_in("username", "ahti")?;
//!     form.fill_in("password", "vellamo")?;
//!
//!     let result = page.submit_form(&form).await?;
//!     println!("landed on {}", result.url());
//!     Ok(())
//! }
//! ```
//!
//! A synchronous facade lives in [`blocking`] for scripts that do not
//! want an async runtime of their own.

pub mod blocking;
pub mod browser;
pub mod dom;
pub mod error;
pub mod http;

pub use browser::{
    BrowserHistory, Enctype, Field, FieldKind, FieldOption, FieldValue, Form, FormMethod,
    FormSubmission, Link, Page, RetryPolicy, RobotsTxt, Session, SessionOptions, Table,
};
pub use dom::{parse_html, Document, Element};
pub use error::{Error, Result};
pub use http::{
    CacheMode, Cookie, CookieJar, HttpCache, HttpClient, MemoryCache, Request, Response,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
