// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browsing session
//!
//! A [`Session`] owns the HTTP client, cookie jar, navigation history,
//! and robots.txt cache. It is a cheap handle: clones share all of that
//! state, which is what lets every [`Page`] carry its session along for
//! chained navigation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::Method;
use url::Url;

use super::config::SessionOptions;
use super::history::BrowserHistory;
use super::page::Page;
use super::robots::RobotsCache;
use crate::error::{Error, Result};
use crate::http::{CookieJar, HttpClient, Request, Response};

/// A browsing session
#[derive(Debug, Clone)]
pub struct Session {
    client: HttpClient,
    options: Arc<SessionOptions>,
    history: Arc<RwLock<BrowserHistory>>,
    robots: Arc<RobotsCache>,
    total_requests: Arc<AtomicU64>,
}

impl Session {
    /// Create a session with default options
    pub fn new() -> Result<Self> {
        Self::with_options(SessionOptions::default())
    }

    /// Create a session with the given options
    pub fn with_options(options: SessionOptions) -> Result<Self> {
        let client = HttpClient::with_config(options.client_config())?;
        Ok(Self {
            client,
            options: Arc::new(options),
            history: Arc::new(RwLock::new(BrowserHistory::new())),
            robots: Arc::new(RobotsCache::new()),
            total_requests: Arc::new(AtomicU64::new(0)),
        })
    }

    /// The session options
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The shared cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        self.client.cookie_jar()
    }

    /// Navigate to a URL, returning the parsed page
    pub async fn open(&self, url: impl AsRef<str>) -> Result<Page> {
        let url = Url::parse(url.as_ref())?;
        self.perform(Method::GET, url, None, None, None).await
    }

    /// Re-open the current location
    pub async fn refresh(&self) -> Result<Page> {
        let current = self
            .history
            .read()
            .current()
            .cloned()
            .ok_or_else(|| Error::History("no page to refresh".to_string()))?;
        self.perform(Method::GET, current, None, None, None).await
    }

    /// Go back `n` entries and re-open that location
    pub async fn back(&self, n: usize) -> Result<Page> {
        let target = self.history.write().back(n)?;
        self.perform(Method::GET, target, None, None, None).await
    }

    /// Go forward `n` entries and re-open that location
    pub async fn forward(&self, n: usize) -> Result<Page> {
        let target = self.history.write().forward(n)?;
        self.perform(Method::GET, target, None, None, None).await
    }

    /// Every URL successfully opened so far, in request order
    pub fn visited(&self) -> Vec<Url> {
        self.history.read().visited().to_vec()
    }

    /// The current location, if any navigation has happened
    pub fn current_url(&self) -> Option<Url> {
        self.history.read().current().cloned()
    }

    /// Number of requests this session has sent (cache hits included)
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Serialize the cookie jar to a JSON file
    pub fn save_cookies(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.cookie_jar().to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load cookies from a JSON file, replacing the jar contents
    ///
    /// A missing file is not an error; the jar is left untouched.
    pub fn load_cookies(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }
        let json = std::fs::read_to_string(path)?;
        let jar = CookieJar::from_json(&json)?;
        self.client.set_cookie_jar(&jar);
        Ok(())
    }

    /// Download a URL into a directory, returning the written file path
    ///
    /// The file name comes from the last URL path segment; when the URL
    /// has none, a name is derived from the response content type.
    pub async fn download_file(
        &self,
        url: impl AsRef<str>,
        dest_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let url = Url::parse(url.as_ref())?;
        self.pre_request(&url).await?;

        let request = Request::from_url(Method::GET, url.clone());
        let response = self.send_with_retry(request).await?;
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        if !response.is_success() {
            return Err(Error::HttpStatus {
                status: response.status_code(),
                url: url.to_string(),
            });
        }

        let name = download_name(&url, response.content_type());
        let dest = dest_dir.as_ref().join(name);
        tokio::fs::write(&dest, response.bytes()).await?;
        tracing::debug!(url = %url, path = %dest.display(), "downloaded file");
        Ok(dest)
    }

    // Robots verdict plus politeness delays, shared by every request path.
    async fn pre_request(&self, url: &Url) -> Result<()> {
        let mut delay = self.options.delay_between_requests;
        if self.options.obey_robots_txt {
            let crawl_delay = self
                .robots
                .check(&self.client, url, &self.options.user_agent)
                .await?;
            delay = match (delay, crawl_delay) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    pub(crate) async fn perform(
        &self,
        method: Method,
        url: Url,
        body: Option<Bytes>,
        content_type: Option<String>,
        referer: Option<&Url>,
    ) -> Result<Page> {
        self.pre_request(&url).await?;

        let mut request = Request::from_url(method.clone(), url.clone());
        if let Some(referer) = referer {
            request = request.header("referer", referer.as_str());
        }
        if let Some(content_type) = &content_type {
            request = request.header("content-type", content_type);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = self.send_with_retry(request).await?;
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            method = %method,
            url = %url,
            status = response.status_code(),
            from_cache = response.from_cache,
            elapsed_ms = response.response_time_ms,
            "request completed"
        );

        if self.options.raise_on_status
            && (response.is_client_error() || response.is_server_error())
        {
            return Err(Error::HttpStatus {
                status: response.status_code(),
                url: response.url.to_string(),
            });
        }

        if self.options.track_history {
            self.history.write().record(response.url.clone());
        }

        Ok(Page::from_response(self.clone(), response))
    }

    async fn send_with_retry(&self, request: Request) -> Result<Response> {
        let policy = &self.options.retry;
        let max_attempts = if policy.applies_to(&request.method) {
            policy.max_attempts.max(1)
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            let result = self.client.execute(request.clone()).await;
            match result {
                Ok(response) => {
                    let status = response.status_code();
                    if attempt < max_attempts
                        && !response.from_cache
                        && policy.should_retry_status(status)
                    {
                        let delay = policy.backoff_delay(attempt);
                        tracing::warn!(
                            url = %request.url,
                            status,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after status"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if attempt < max_attempts && err.is_retryable() {
                        let delay = policy.backoff_delay(attempt);
                        tracing::warn!(
                            url = %request.url,
                            error = %err,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after transport error"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}

fn download_name(url: &Url, content_type: Option<&str>) -> String {
    let from_path = url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|s| !s.is_empty());
    if let Some(name) = from_path {
        return name.to_string();
    }

    let extension = match content_type {
        Some(ct) if ct.starts_with("text/html") => "html",
        Some(ct) if ct.starts_with("text/plain") => "txt",
        Some(ct) if ct.starts_with("application/json") => "json",
        Some(ct) if ct.starts_with("application/pdf") => "pdf",
        Some(ct) if ct.starts_with("image/png") => "png",
        Some(ct) if ct.starts_with("image/jpeg") => "jpg",
        _ => "bin",
    };
    format!("download.{}", extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = Session::new().unwrap();
        assert_eq!(session.total_requests(), 0);
        assert!(session.current_url().is_none());
        assert!(session.visited().is_empty());
    }

    #[test]
    fn test_clones_share_history() {
        let session = Session::new().unwrap();
        let clone = session.clone();
        session
            .history
            .write()
            .record(Url::parse("https://example.com/").unwrap());
        assert_eq!(clone.visited().len(), 1);
    }

    #[test]
    fn test_download_name_from_path() {
        let url = Url::parse("https://x.test/files/report.pdf").unwrap();
        assert_eq!(download_name(&url, None), "report.pdf");
    }

    #[test]
    fn test_download_name_from_content_type() {
        let url = Url::parse("https://x.test/").unwrap();
        assert_eq!(download_name(&url, Some("text/html; charset=utf-8")), "download.html");
        assert_eq!(download_name(&url, None), "download.bin");
    }
}
