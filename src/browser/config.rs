// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session configuration and retry policy

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;

use crate::http::{HttpCache, HttpClientConfig, DEFAULT_USER_AGENT};

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// User agent string
    pub user_agent: String,
    /// Default timeout for requests
    pub timeout: Duration,
    /// Follow redirects
    pub follow_redirects: bool,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Raise `Error::HttpStatus` on 4xx/5xx responses
    pub raise_on_status: bool,
    /// Consult robots.txt before navigating
    pub obey_robots_txt: bool,
    /// Record visited URLs and maintain back/forward stacks
    pub track_history: bool,
    /// Fixed pause before each request
    pub delay_between_requests: Option<Duration>,
    /// Response cache
    pub cache: Option<Arc<dyn HttpCache>>,
    /// Methods whose responses may be cached
    pub cacheable_methods: Vec<Method>,
    /// Status codes whose responses may be cached
    pub cacheable_statuses: Vec<u16>,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            follow_redirects: true,
            max_redirects: 10,
            accept_invalid_certs: false,
            proxy: None,
            raise_on_status: false,
            obey_robots_txt: false,
            track_history: true,
            delay_between_requests: None,
            cache: None,
            cacheable_methods: vec![Method::GET],
            cacheable_statuses: vec![200, 203, 300, 301, 308],
            retry: RetryPolicy::default(),
        }
    }
}

impl SessionOptions {
    /// Create new default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable/disable redirect following
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Raise errors on 4xx/5xx responses instead of returning the page
    pub fn raise_on_status(mut self, raise: bool) -> Self {
        self.raise_on_status = raise;
        self
    }

    /// Consult robots.txt before navigating
    pub fn obey_robots_txt(mut self, obey: bool) -> Self {
        self.obey_robots_txt = obey;
        self
    }

    /// Enable/disable history tracking
    pub fn track_history(mut self, track: bool) -> Self {
        self.track_history = track;
        self
    }

    /// Pause for a fixed duration before each request
    pub fn delay_between_requests(mut self, delay: Duration) -> Self {
        self.delay_between_requests = Some(delay);
        self
    }

    /// Attach a response cache
    pub fn cache(mut self, cache: Arc<dyn HttpCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set a proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub(crate) fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            follow_redirects: self.follow_redirects,
            max_redirects: self.max_redirects,
            accept_invalid_certs: self.accept_invalid_certs,
            proxy: self.proxy.clone(),
            cache: self.cache.clone(),
            cacheable_methods: self.cacheable_methods.clone(),
            cacheable_statuses: self.cacheable_statuses.clone(),
            ..HttpClientConfig::default()
        }
    }
}

/// Outer retry loop configuration
///
/// Retries wrap the transport call: transient transport errors and
/// forcelist statuses are retried with exponential backoff, and after the
/// final attempt the last error (or last response) surfaces unmodified.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Whether retries are enabled at all
    pub enabled: bool,
    /// Maximum total attempts (first try included)
    pub max_attempts: u32,
    /// Status codes that trigger a retry
    pub status_forcelist: Vec<u16>,
    /// Methods eligible for retrying
    pub method_whitelist: Vec<Method>,
    /// Base backoff delay, doubled on every further attempt
    pub backoff_base: Duration,
    /// Upper bound on a single backoff delay
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: 3,
            status_forcelist: vec![429, 500, 502, 503, 504],
            method_whitelist: vec![Method::HEAD, Method::GET, Method::OPTIONS],
            backoff_base: Duration::from_millis(500),
            backoff_max: Duration::from_secs(100),
        }
    }
}

impl RetryPolicy {
    /// Enabled policy with the given attempt budget
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            enabled: true,
            max_attempts,
            ..Default::default()
        }
    }

    /// Check whether this policy covers the given method
    pub fn applies_to(&self, method: &Method) -> bool {
        self.enabled && self.method_whitelist.contains(method)
    }

    /// Check whether a status code should be retried
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Backoff delay before the attempt following `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        let delay = self.backoff_base.saturating_mul(1u32 << exp);
        delay.min(self.backoff_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = SessionOptions::new()
            .user_agent("custom-agent")
            .raise_on_status(true)
            .timeout(Duration::from_secs(5));

        assert_eq!(options.user_agent, "custom-agent");
        assert!(options.raise_on_status);
        assert_eq!(options.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_retry_applies_to_safe_methods_only() {
        let policy = RetryPolicy::with_max_attempts(2);
        assert!(policy.applies_to(&Method::GET));
        assert!(!policy.applies_to(&Method::POST));

        let disabled = RetryPolicy::default();
        assert!(!disabled.applies_to(&Method::GET));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            enabled: true,
            backoff_base: Duration::from_millis(100),
            backoff_max: Duration::from_millis(350),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(350));
    }
}
