//! Configuration for content acquisition

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser-like user agent; some sites refuse obvious bots
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Settings for fetching and extracting pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header value
    pub user_agent: String,

    /// Accept-Language header value
    pub accept_language: String,

    /// Redirects followed before giving up
    pub max_redirects: usize,

    /// Characters of body text kept per page
    pub excerpt_chars: usize,

    /// Links processed per message; the rest are dropped
    pub max_urls: usize,

    /// Pages fetched at the same time
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "zh-TW,zh;q=0.9,en;q=0.8".to_string(),
            max_redirects: 5,
            excerpt_chars: 1_200,
            max_urls: 20,
            concurrency: 8,
        }
    }
}

impl FetchConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if self.max_urls == 0 {
            return Err("max_urls must be greater than 0".to_string());
        }
        if self.excerpt_chars == 0 {
            return Err("excerpt_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}
