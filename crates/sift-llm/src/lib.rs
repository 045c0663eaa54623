//! Sift LLM Provider Layer
//!
//! Language-model access for the extraction pipeline.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `sift-domain` and the machinery that drives one logical call across many
//! credentials and models:
//!
//! ```text
//! prompt ─► Orchestrator ─► ProviderMatrix (model × key) ─► LlmProvider
//!                 ▲                                            │
//!                 └──────── validator(response) ◄──────────────┘
//! ```
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `GeminiProvider`: Google Generative Language REST API
//!
//! # Examples
//!
//! ```
//! use sift_llm::{MockProvider, Orchestrator, ProviderMatrix};
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new(r#"{"title": "hello"}"#);
//! let matrix = ProviderMatrix::new(vec!["key-a".into()], vec!["model-x".into()]).unwrap();
//! let orchestrator = Orchestrator::new(provider, matrix);
//!
//! let text = orchestrator.invoke("prompt", |r| r.contains("title")).await.unwrap();
//! assert!(text.contains("hello"));
//! # });
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod gemini;
pub mod matrix;
pub mod orchestrator;

use async_trait::async_trait;
use parking_lot::Mutex;
use sift_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use config::LlmConfig;
pub use gemini::GeminiProvider;
pub use matrix::{MatrixCursor, MatrixDims, ModelId, ProviderCredential, ProviderMatrix};
pub use orchestrator::{classify_failure, AttemptOutcome, FailureKind, InvocationAttempt, Orchestrator};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit or quota exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Credential rejected
    #[error("Permission denied: {0}")]
    Unauthorized(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Invalid provider configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every matrix cell was tried and none produced a usable response
    #[error("All providers exhausted after {} attempts: {last_error}", .attempts.len())]
    Exhausted {
        /// Attempts made during the sweep, in order
        attempts: Vec<InvocationAttempt>,
        /// The last observed failure
        last_error: String,
    },

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether this is the orchestrator's exhaustion failure
    pub fn is_exhausted(&self) -> bool {
        matches!(self, LlmError::Exhausted { .. })
    }
}

/// One call observed by [`MockProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// Key the call was made with
    pub api_key: String,
    /// Model the call was made with
    pub model: String,
    /// Prompt text
    pub prompt: String,
}

#[derive(Debug, Default)]
struct MockState {
    queued: VecDeque<Result<String, String>>,
    rules: Vec<(String, Result<String, String>)>,
    calls: Vec<MockCall>,
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Responses are chosen in this order:
///
/// 1. queued replies (see [`MockProvider::push_reply`]), oldest first
/// 2. the first rule whose needle occurs in the prompt
/// 3. the default response
///
/// # Examples
///
/// ```
/// use sift_llm::MockProvider;
/// use sift_domain::traits::LlmProvider;
///
/// # tokio_test::block_on(async {
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("k", "m", "any prompt").await.unwrap(), "Fixed response");
///
/// // Prompt-dependent responses
/// let mut provider = MockProvider::default();
/// provider.add_response("weather", "sunny");
/// assert_eq!(provider.generate("k", "m", "what is the weather").await.unwrap(), "sunny");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: Result<String, String>,
    latency: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: Ok(response.into()),
            latency: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a MockProvider whose every call fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            default_response: Err(message.into()),
            latency: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer prompts containing `needle` with `response`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.state
            .lock()
            .rules
            .push((needle.into(), Ok(response.into())));
    }

    /// Fail prompts containing `needle` with `message`
    pub fn add_error(&mut self, needle: impl Into<String>, message: impl Into<String>) {
        self.state
            .lock()
            .rules
            .push((needle.into(), Err(message.into())));
    }

    /// Queue a one-shot reply, consumed before any rule applies
    pub fn push_reply(&self, reply: Result<&str, &str>) {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        self.state.lock().queued.push_back(reply);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Reset the call log
    pub fn reset_call_count(&self) {
        self.state.lock().calls.clear();
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    fn reply_for(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, String> {
        let mut state = self.state.lock();
        state.calls.push(MockCall {
            api_key: api_key.to_string(),
            model: model.to_string(),
            prompt: prompt.to_string(),
        });

        if let Some(reply) = state.queued.pop_front() {
            return reply;
        }

        state
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn generate(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, Self::Error> {
        let reply = self.reply_for(api_key, model, prompt);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        reply.map_err(LlmError::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("k", "m", "any prompt").await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("k", "m", "say hello").await.unwrap(), "world");
        assert_eq!(provider.generate("k", "m", "foo?").await.unwrap(), "bar");
        assert_eq!(
            provider.generate("k", "m", "unknown").await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_queue_takes_precedence() {
        let mut provider = MockProvider::new("default");
        provider.add_response("x", "rule");
        provider.push_reply(Err("429 rate limit"));
        provider.push_reply(Ok("queued"));

        assert!(provider.generate("k", "m", "x").await.is_err());
        assert_eq!(provider.generate("k", "m", "x").await.unwrap(), "queued");
        assert_eq!(provider.generate("k", "m", "x").await.unwrap(), "rule");
    }

    #[tokio::test]
    async fn test_mock_provider_call_log() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);
        provider.generate("key-1", "model-a", "prompt1").await.unwrap();
        provider.generate("key-2", "model-b", "prompt2").await.unwrap();
        assert_eq!(provider.call_count(), 2);

        let calls = provider.calls();
        assert_eq!(calls[1].api_key, "key-2");
        assert_eq!(calls[1].model, "model-b");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt", "boom");

        let result = provider.generate("k", "m", "a bad prompt").await;
        assert!(matches!(result, Err(LlmError::Other(ref m)) if m == "boom"));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("k", "m", "test").await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_exhausted_display_counts_attempts() {
        let err = LlmError::Exhausted {
            attempts: vec![
                InvocationAttempt {
                    key_index: 0,
                    model: ModelId::from("m"),
                    outcome: AttemptOutcome::ValidationFailure,
                },
                InvocationAttempt {
                    key_index: 1,
                    model: ModelId::from("m"),
                    outcome: AttemptOutcome::ValidationFailure,
                },
            ],
            last_error: "nope".into(),
        };
        assert_eq!(err.to_string(), "All providers exhausted after 2 attempts: nope");
        assert!(err.is_exhausted());
    }
}
