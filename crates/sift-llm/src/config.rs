//! Provider configuration
//!
//! Keys come from the environment; everything else may also live in a TOML
//! file next to the extractor settings.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Models tried when none are configured, most capable first
pub const DEFAULT_MODELS: [&str; 3] = ["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-flash-8b"];

/// Environment variable holding comma-separated keys
pub const ENV_API_KEYS: &str = "GEMINI_API_KEYS";
/// Environment variable holding a single key
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable holding comma-separated model names
pub const ENV_MODELS: &str = "GEMINI_MODELS";

/// Settings for the provider matrix and orchestrator
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API keys, in rotation order
    #[serde(skip_serializing)]
    pub api_keys: Vec<String>,

    /// Model names, most capable first
    pub models: Vec<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Base delay after a transient failure
    pub retry_backoff_ms: u64,

    /// Upper bound for a single backoff sleep
    pub max_backoff_ms: u64,

    /// Wall-clock bound for one sweep; `None` disables it
    pub sweep_deadline_secs: Option<u64>,

    /// Full passes over the matrix before giving up
    pub max_cycles: u32,

    /// Override for the provider base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            request_timeout_secs: 15,
            retry_backoff_ms: 500,
            max_backoff_ms: 4_000,
            sweep_deadline_secs: Some(60),
            max_cycles: 1,
            endpoint: None,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("models", &self.models)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("max_backoff_ms", &self.max_backoff_ms)
            .field("sweep_deadline_secs", &self.sweep_deadline_secs)
            .field("max_cycles", &self.max_cycles)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl LlmConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Overlay values from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys = lookup(ENV_API_KEYS)
            .map(|v| split_list(&v))
            .filter(|v| !v.is_empty())
            .or_else(|| lookup(ENV_API_KEY).map(|v| split_list(&v)))
            .unwrap_or_default();
        if !keys.is_empty() {
            self.api_keys = keys;
        }

        if let Some(models) = lookup(ENV_MODELS).map(|v| split_list(&v)) {
            if !models.is_empty() {
                self.models = models;
            }
        }

        if let Some(cycles) = lookup("SIFT_LLM_MAX_CYCLES").and_then(|v| v.trim().parse().ok()) {
            self.max_cycles = cycles;
        }

        if let Some(secs) = lookup("SIFT_LLM_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.request_timeout_secs = secs;
        }

        self
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.api_keys.is_empty() {
            return Err(LlmError::Config(format!(
                "no API keys configured (set {} or {})",
                ENV_API_KEYS, ENV_API_KEY
            )));
        }
        if self.models.is_empty() {
            return Err(LlmError::Config("no models configured".to_string()));
        }
        if self.max_cycles == 0 {
            return Err(LlmError::Config("max_cycles must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(LlmError::Config("request_timeout_secs must be positive".to_string()));
        }
        if self.max_backoff_ms < self.retry_backoff_ms {
            return Err(LlmError::Config(
                "max_backoff_ms must not be smaller than retry_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Sweep deadline, if enabled
    pub fn sweep_deadline(&self) -> Option<Duration> {
        self.sweep_deadline_secs.map(Duration::from_secs)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
