// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! robots.txt fetching, parsing, and rule matching
//!
//! One robots.txt is fetched per origin and kept for the session's
//! lifetime. Failures are permissive: an unreachable or non-2xx
//! robots.txt allows everything.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::Method;
use url::Url;

use crate::error::{Error, Result};
use crate::http::{CacheMode, HttpClient, Request};

#[derive(Debug, Clone)]
struct Rule {
    allow: bool,
    path: String,
}

#[derive(Debug, Clone, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
    crawl_delay: Option<Duration>,
}

/// Parsed robots.txt rules for one origin
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    groups: Vec<Group>,
}

impl RobotsTxt {
    /// Parse robots.txt text
    pub fn parse(text: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut current: Option<Group> = None;
        // Consecutive user-agent lines share the group that follows
        let mut collecting_agents = false;

        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !collecting_agents {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                        current = Some(Group::default());
                        collecting_agents = true;
                    }
                    if let Some(group) = &mut current {
                        group.agents.push(value.to_ascii_lowercase());
                    }
                }
                "allow" | "disallow" => {
                    collecting_agents = false;
                    if let Some(group) = &mut current {
                        // An empty disallow means "allow everything"
                        if !value.is_empty() {
                            group.rules.push(Rule {
                                allow: key == "allow",
                                path: value.to_string(),
                            });
                        }
                    }
                }
                "crawl-delay" => {
                    collecting_agents = false;
                    if let Some(group) = &mut current {
                        group.crawl_delay = value
                            .parse::<f64>()
                            .ok()
                            .filter(|s| *s >= 0.0)
                            .map(Duration::from_secs_f64);
                    }
                }
                _ => {
                    collecting_agents = false;
                }
            }
        }
        if let Some(group) = current.take() {
            groups.push(group);
        }

        Self { groups }
    }

    fn group_for(&self, user_agent: &str) -> Option<&Group> {
        let agent = user_agent.to_ascii_lowercase();
        // The most specific matching agent token wins, "*" last
        self.groups
            .iter()
            .filter_map(|g| {
                g.agents
                    .iter()
                    .filter(|a| *a == "*" || agent.contains(a.as_str()))
                    .map(|a| if a == "*" { 0 } else { a.len() })
                    .max()
                    .map(|score| (score, g))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, g)| g)
    }

    /// Check whether the given URL may be fetched by `user_agent`
    ///
    /// The longest matching rule decides; on a length tie allow wins.
    /// URLs no rule covers are allowed.
    pub fn is_allowed(&self, url: &Url, user_agent: &str) -> bool {
        let Some(group) = self.group_for(user_agent) else {
            return true;
        };
        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        let mut verdict = true;
        let mut longest = 0;
        for rule in &group.rules {
            if path.starts_with(&rule.path) {
                let len = rule.path.len();
                if len > longest || (len == longest && rule.allow) {
                    longest = len;
                    verdict = rule.allow;
                }
            }
        }
        verdict
    }

    /// Crawl delay declared for `user_agent`, if any
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        self.group_for(user_agent).and_then(|g| g.crawl_delay)
    }
}

/// Per-origin robots.txt cache
#[derive(Debug, Default)]
pub(crate) struct RobotsCache {
    by_origin: DashMap<String, Arc<RobotsTxt>>,
}

impl RobotsCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check whether `url` may be fetched, returning the crawl delay
    ///
    /// Fetches and caches the origin's robots.txt on first use. Returns
    /// `Error::DisallowedByRobots` when the rules deny the URL.
    pub(crate) async fn check(
        &self,
        client: &HttpClient,
        url: &Url,
        user_agent: &str,
    ) -> Result<Option<Duration>> {
        let Some(origin) = origin_of(url) else {
            return Ok(None);
        };

        let robots = match self.by_origin.get(&origin) {
            Some(cached) => Arc::clone(&cached),
            None => {
                let fetched = Arc::new(self.fetch(client, &origin).await);
                self.by_origin.insert(origin, Arc::clone(&fetched));
                fetched
            }
        };

        if !robots.is_allowed(url, user_agent) {
            return Err(Error::DisallowedByRobots {
                url: url.to_string(),
            });
        }
        Ok(robots.crawl_delay(user_agent))
    }

    // Robots responses bypass the session's page cache; any failure
    // yields the empty (all-allowing) rule set.
    async fn fetch(&self, client: &HttpClient, origin: &str) -> RobotsTxt {
        let Ok(robots_url) = Url::parse(&format!("{}/robots.txt", origin)) else {
            return RobotsTxt::default();
        };
        let request =
            Request::from_url(Method::GET, robots_url).cache_mode(CacheMode::NoStore);
        match client.execute(request).await {
            Ok(response) if response.is_success() => RobotsTxt::parse(&response.text_lossy()),
            _ => RobotsTxt::default(),
        }
    }
}

fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let mut origin = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        origin.push_str(&format!(":{}", port));
    }
    Some(origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    const ROBOTS: &str = "\
# comments are ignored
User-agent: *
Disallow: /private/
Allow: /private/public
Crawl-delay: 2

User-agent: mustekala
Disallow: /only-for-others/
";

    #[test]
    fn test_disallow_prefix() {
        let robots = RobotsTxt::parse(ROBOTS);
        assert!(!robots.is_allowed(&url("https://x.test/private/page"), "somebot"));
        assert!(robots.is_allowed(&url("https://x.test/open"), "somebot"));
    }

    #[test]
    fn test_longest_rule_wins() {
        let robots = RobotsTxt::parse(ROBOTS);
        // /private/public is a longer allow than the /private/ disallow
        assert!(robots.is_allowed(&url("https://x.test/private/public/x"), "somebot"));
    }

    #[test]
    fn test_specific_agent_group_preferred() {
        let robots = RobotsTxt::parse(ROBOTS);
        // The named group has no /private/ rule
        assert!(robots.is_allowed(&url("https://x.test/private/page"), "mustekala/0.1"));
        assert!(!robots.is_allowed(
            &url("https://x.test/only-for-others/page"),
            "mustekala/0.1"
        ));
    }

    #[test]
    fn test_crawl_delay() {
        let robots = RobotsTxt::parse(ROBOTS);
        assert_eq!(robots.crawl_delay("somebot"), Some(Duration::from_secs(2)));
        assert_eq!(robots.crawl_delay("mustekala"), None);
    }

    #[test]
    fn test_empty_rules_allow_everything() {
        let robots = RobotsTxt::parse("");
        assert!(robots.is_allowed(&url("https://x.test/anything"), "bot"));
        assert_eq!(robots.crawl_delay("bot"), None);
    }

    #[test]
    fn test_empty_disallow_line() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow:\n");
        assert!(robots.is_allowed(&url("https://x.test/a"), "bot"));
    }

    #[test]
    fn test_query_included_in_match() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /search?q=\n");
        assert!(!robots.is_allowed(&url("https://x.test/search?q=x"), "bot"));
        assert!(robots.is_allowed(&url("https://x.test/search"), "bot"));
    }

    #[test]
    fn test_allow_wins_on_tie() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /a/\nAllow: /a/\n");
        assert!(robots.is_allowed(&url("https://x.test/a/x"), "bot"));
    }

    #[test]
    fn test_shared_agent_lines() {
        let robots = RobotsTxt::parse(
            "User-agent: alpha\nUser-agent: beta\nDisallow: /\n",
        );
        assert!(!robots.is_allowed(&url("https://x.test/x"), "alpha"));
        assert!(!robots.is_allowed(&url("https://x.test/x"), "beta"));
        assert!(robots.is_allowed(&url("https://x.test/x"), "gamma"));
    }
}
