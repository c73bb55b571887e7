// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Synchronous facade over the async session
//!
//! Each blocking [`Session`] owns a current-thread tokio runtime and
//! drives the async implementation to completion call by call. Pages
//! share the runtime so chained navigation stays synchronous. Do not use
//! these types from inside an async context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use regex::Regex;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::browser;
use crate::browser::{Form, Link, SessionOptions, Table};
use crate::error::Result;
use crate::http::{Cookie, CookieJar};

/// Blocking browsing session
#[derive(Debug, Clone)]
pub struct Session {
    inner: browser::Session,
    rt: Arc<Runtime>,
}

impl Session {
    /// Create a blocking session with default options
    pub fn new() -> Result<Self> {
        Self::with_options(SessionOptions::default())
    }

    /// Create a blocking session with the given options
    pub fn with_options(options: SessionOptions) -> Result<Self> {
        let rt = Builder::new_current_thread().enable_all().build()?;
        let inner = browser::Session::with_options(options)?;
        Ok(Self {
            inner,
            rt: Arc::new(rt),
        })
    }

    fn wrap(&self, page: browser::Page) -> Page {
        Page {
            inner: page,
            rt: Arc::clone(&self.rt),
        }
    }

    /// Navigate to a URL
    pub fn open(&self, url: impl AsRef<str>) -> Result<Page> {
        self.rt.block_on(self.inner.open(url)).map(|p| self.wrap(p))
    }

    /// Re-open the current location
    pub fn refresh(&self) -> Result<Page> {
        self.rt.block_on(self.inner.refresh()).map(|p| self.wrap(p))
    }

    /// Go back `n` entries and re-open that location
    pub fn back(&self, n: usize) -> Result<Page> {
        self.rt.block_on(self.inner.back(n)).map(|p| self.wrap(p))
    }

    /// Go forward `n` entries and re-open that location
    pub fn forward(&self, n: usize) -> Result<Page> {
        self.rt
            .block_on(self.inner.forward(n))
            .map(|p| self.wrap(p))
    }

    /// Download a URL into a directory, returning the written file path
    pub fn download_file(
        &self,
        url: impl AsRef<str>,
        dest_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.rt.block_on(self.inner.download_file(url, dest_dir))
    }

    /// Every URL successfully opened so far, in request order
    pub fn visited(&self) -> Vec<Url> {
        self.inner.visited()
    }

    /// The current location, if any navigation has happened
    pub fn current_url(&self) -> Option<Url> {
        self.inner.current_url()
    }

    /// Number of requests this session has sent
    pub fn total_requests(&self) -> u64 {
        self.inner.total_requests()
    }

    /// The shared cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        self.inner.cookie_jar()
    }

    /// Serialize the cookie jar to a JSON file
    pub fn save_cookies(&self, path: impl AsRef<Path>) -> Result<()> {
        self.inner.save_cookies(path)
    }

    /// Load cookies from a JSON file, replacing the jar contents
    pub fn load_cookies(&self, path: impl AsRef<Path>) -> Result<()> {
        self.inner.load_cookies(path)
    }
}

/// Blocking page handle
#[derive(Debug, Clone)]
pub struct Page {
    inner: browser::Page,
    rt: Arc<Runtime>,
}

impl Page {
    fn wrap(&self, page: browser::Page) -> Page {
        Page {
            inner: page,
            rt: Arc::clone(&self.rt),
        }
    }

    /// The final URL (after redirects)
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    /// The response status
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// The response status as u16
    pub fn status_code(&self) -> u16 {
        self.inner.status_code()
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.inner.is_success()
    }

    /// The response headers
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// The raw response body
    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// The body as text, lossy conversion
    pub fn text(&self) -> String {
        self.inner.text()
    }

    /// The `<title>` text, if any
    pub fn title(&self) -> Option<String> {
        self.inner.title()
    }

    /// Whether this page was served from the session cache
    pub fn from_cache(&self) -> bool {
        self.inner.from_cache()
    }

    /// Cookies currently applicable to this page's URL
    pub fn cookies(&self) -> Vec<Cookie> {
        self.inner.cookies()
    }

    /// The first form on the page
    pub fn get_form(&self) -> Result<Form> {
        self.inner.get_form()
    }

    /// All forms on the page
    pub fn get_forms(&self) -> Result<Vec<Form>> {
        self.inner.get_forms()
    }

    /// The form with the given id attribute
    pub fn get_form_by_id(&self, id: &str) -> Result<Form> {
        self.inner.get_form_by_id(id)
    }

    /// The first table on the page
    pub fn get_table(&self) -> Result<Table> {
        self.inner.get_table()
    }

    /// All tables on the page
    pub fn get_tables(&self) -> Result<Vec<Table>> {
        self.inner.get_tables()
    }

    /// All links on the page
    pub fn get_links(&self) -> &[Link] {
        self.inner.get_links()
    }

    /// Links whose text contains `text` (case-sensitive)
    pub fn get_links_by_text<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.inner.get_links_by_text(text)
    }

    /// Links whose text matches the regex
    pub fn get_links_by_regex<'a>(
        &'a self,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.inner.get_links_by_regex(pattern)
    }

    /// Follow a link
    pub fn click_link(&self, link: &Link) -> Result<Page> {
        self.rt
            .block_on(self.inner.click_link(link))
            .map(|p| self.wrap(p))
    }

    /// Follow the single link whose text equals `text`, ignoring case
    pub fn click_link_by_text(&self, text: &str) -> Result<Page> {
        self.rt
            .block_on(self.inner.click_link_by_text(text))
            .map(|p| self.wrap(p))
    }

    /// Submit a form as-is
    pub fn submit_form(&self, form: &Form) -> Result<Page> {
        self.rt
            .block_on(self.inner.submit_form(form))
            .map(|p| self.wrap(p))
    }

    /// Submit a form, electing a submit button and appending extra values
    pub fn submit_form_with(
        &self,
        form: &Form,
        submit_button: Option<&str>,
        extra: &[(&str, &str)],
    ) -> Result<Page> {
        self.rt
            .block_on(self.inner.submit_form_with(form, submit_button, extra))
            .map(|p| self.wrap(p))
    }
}
