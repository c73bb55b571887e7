// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::time::Duration;
use url::Url;

use super::cache::{cache_key, CachedResponse, HttpCache};
use super::cookie::CookieJar;
use super::request::{CacheMode, Request};
use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Follow redirects
    pub follow_redirects: bool,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Enable cookie handling
    pub handle_cookies: bool,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Response cache
    pub cache: Option<Arc<dyn HttpCache>>,
    /// Methods whose responses may be cached
    pub cacheable_methods: Vec<Method>,
    /// Status codes whose responses may be cached
    pub cacheable_statuses: Vec<u16>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            "accept-language",
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            follow_redirects: true,
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            handle_cookies: true,
            proxy: None,
            cache: None,
            cacheable_methods: vec![Method::GET],
            cacheable_statuses: vec![200, 203, 300, 301, 308],
        }
    }
}

/// HTTP client with cookie management and response caching
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<HttpClientConfig>,
    cookie_jar: CookieJar,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let redirect_policy = if config.follow_redirects {
            Policy::limited(config.max_redirects)
        } else {
            Policy::none()
        };

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(redirect_policy)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone())
            .cookie_store(false); // We handle cookies ourselves

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::other(format!("invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
            cookie_jar: CookieJar::new(),
        })
    }

    /// Get the cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Replace the cookie jar contents (cookie import)
    pub fn set_cookie_jar(&self, jar: &CookieJar) {
        self.cookie_jar.import(jar.export());
    }

    /// Execute a GET request
    pub async fn get(&self, url: impl AsRef<str>) -> Result<Response> {
        self.execute(Request::get(url)?).await
    }

    /// Execute a request
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let key = cache_key(&request.method, &request.url);
        let cacheable = self.config.cache.is_some()
            && self.config.cacheable_methods.contains(&request.method);

        if cacheable && request.cache_mode == CacheMode::Default {
            if let Some(cache) = &self.config.cache {
                if let Some(hit) = cache.get(&key) {
                    let mut response =
                        Response::new(hit.status, hit.headers, hit.body, hit.url, false, 0);
                    response.from_cache = true;
                    return Ok(response);
                }
            }
        }

        let start = Instant::now();

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        if self.config.handle_cookies {
            if let Some(cookie_header) = self.cookie_jar.get_cookie_header(&request.url) {
                builder = builder.header("cookie", cookie_header);
            }
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;

        let redirected = response.url() != &request.url;
        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        let response_time = start.elapsed().as_millis() as u64;

        // The jar is only touched once the body has been fully read: a
        // cancelled in-flight request must not leave partial cookie state.
        if self.config.handle_cookies {
            for cookie in headers.get_all("set-cookie") {
                if let Ok(cookie_str) = cookie.to_str() {
                    self.cookie_jar.add_from_header(cookie_str, &final_url);
                }
            }
        }

        if cacheable
            && request.cache_mode != CacheMode::NoStore
            && self.config.cacheable_statuses.contains(&status.as_u16())
        {
            if let Some(cache) = &self.config.cache {
                cache.put(
                    key,
                    CachedResponse {
                        status,
                        headers: headers.clone(),
                        body: body.clone(),
                        url: final_url.clone(),
                    },
                );
            }
        }

        Ok(Response::new(
            status,
            headers,
            body,
            final_url,
            redirected,
            response_time,
        ))
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check whether a URL would currently be served from the cache
    pub fn is_cached(&self, method: &Method, url: &Url) -> bool {
        self.config
            .cache
            .as_ref()
            .map(|c| c.get(&cache_key(method, url)).is_some())
            .unwrap_or(false)
    }
}
