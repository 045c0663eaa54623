//! Invocation orchestrator
//!
//! Turns one logical "ask the model" call into a bounded sweep across the
//! [`ProviderMatrix`]. Each cell gets at most one request per cycle. A
//! response only counts once the caller's validator accepts it.
//!
//! # Failure handling
//!
//! - quota / permission errors advance to the next cell at once
//! - other transport errors back off first (linear, capped)
//! - validator rejections advance without retrying the same cell
//!
//! A successful sweep leaves the shared cursor on the winning cell. An
//! exhausted sweep resets it to the origin.

use crate::matrix::{MatrixCursor, ModelId, ProviderMatrix};
use crate::{LlmConfig, LlmError};
use sift_domain::traits::LlmProvider;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

const QUOTA_PATTERNS: &[&str] = &[
    "429",
    "quota",
    "rate limit",
    "resource_exhausted",
    "permission",
    "403",
    "401",
    "api key",
    "unauthorized",
    "too many requests",
];

/// How a transport failure should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Key or quota problem; waiting will not help this cell
    Quota,
    /// Anything else; worth a short pause before the next cell
    Transient,
}

/// Classify a provider error by its text
pub fn classify_failure(message: &str) -> FailureKind {
    let lowered = message.to_lowercase();
    if QUOTA_PATTERNS.iter().any(|p| lowered.contains(p)) {
        FailureKind::Quota
    } else {
        FailureKind::Transient
    }
}

/// What happened on one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The response was accepted
    Success,
    /// The provider returned an error
    TransportError(String),
    /// The response was rejected by the validator
    ValidationFailure,
}

/// One request made during a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationAttempt {
    /// Credential position used
    pub key_index: usize,
    /// Model used
    pub model: ModelId,
    /// Result of the request
    pub outcome: AttemptOutcome,
}

/// Drives a provider across the credential/model matrix
pub struct Orchestrator<P> {
    provider: P,
    matrix: ProviderMatrix,
    retry_backoff: Duration,
    max_backoff: Duration,
    sweep_deadline: Option<Duration>,
    max_cycles: u32,
}

impl<P: LlmProvider> Orchestrator<P> {
    /// Create an orchestrator with default timing (500 ms backoff step,
    /// 4 s cap, 60 s sweep deadline, one cycle)
    pub fn new(provider: P, matrix: ProviderMatrix) -> Self {
        Self {
            provider,
            matrix,
            retry_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(4),
            sweep_deadline: Some(Duration::from_secs(60)),
            max_cycles: 1,
        }
    }

    /// Create an orchestrator from configuration
    pub fn from_config(provider: P, config: &LlmConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let matrix = ProviderMatrix::from_config(config)?;
        Ok(Self::new(provider, matrix)
            .with_backoff(
                Duration::from_millis(config.retry_backoff_ms),
                Duration::from_millis(config.max_backoff_ms),
            )
            .with_sweep_deadline(config.sweep_deadline())
            .with_max_cycles(config.max_cycles))
    }

    /// Set the backoff step and cap for transient failures
    pub fn with_backoff(mut self, step: Duration, cap: Duration) -> Self {
        self.retry_backoff = step;
        self.max_backoff = cap;
        self
    }

    /// Set or disable the sweep deadline
    pub fn with_sweep_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.sweep_deadline = deadline;
        self
    }

    /// Set the default number of cycles per call
    pub fn with_max_cycles(mut self, cycles: u32) -> Self {
        self.max_cycles = cycles.max(1);
        self
    }

    /// The underlying matrix
    pub fn matrix(&self) -> &ProviderMatrix {
        &self.matrix
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Default number of cycles
    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }

    /// Run a sweep with the default number of cycles
    pub async fn invoke<F>(&self, prompt: &str, is_valid: F) -> Result<String, LlmError>
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        self.invoke_with_cycles(prompt, is_valid, self.max_cycles).await
    }

    /// Run a sweep starting from the shared cursor and publish where it ends
    ///
    /// Concurrent calls each start from the snapshot they read and publish
    /// their own end cursor; the last one to finish wins. Either cursor is
    /// a valid cell, so the next sweep still covers the whole grid.
    pub async fn invoke_with_cycles<F>(
        &self,
        prompt: &str,
        is_valid: F,
        max_cycles: u32,
    ) -> Result<String, LlmError>
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let start = self.matrix.snapshot();
        let (result, end) = self.invoke_from(start, prompt, is_valid, max_cycles).await;
        self.matrix.publish(end);
        result
    }

    /// Run a sweep from an explicit cursor
    ///
    /// Returns the result together with the cursor the next call should
    /// start from. The shared cursor is not touched.
    pub async fn invoke_from<F>(
        &self,
        cursor: MatrixCursor,
        prompt: &str,
        is_valid: F,
        max_cycles: u32,
    ) -> (Result<String, LlmError>, MatrixCursor)
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let dims = self.matrix.dims();
        let total = dims.cells() * max_cycles.max(1) as usize;
        let deadline = self.sweep_deadline.map(|d| Instant::now() + d);

        let mut cursor = cursor.normalized(dims);
        let mut attempts = Vec::with_capacity(total);
        let mut last_error: Option<String> = None;
        let mut transient_streak: u32 = 0;

        for attempt in 0..total {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(attempts = attempts.len(), "Sweep deadline exceeded");
                last_error = Some("sweep deadline exceeded".to_string());
                break;
            }

            let (credential, model) = self.matrix.cell(cursor);
            let call = self.provider.generate(credential.expose(), model.as_str(), prompt);
            let outcome = match deadline {
                Some(d) => match tokio::time::timeout_at(d, call).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(
                            key_index = credential.index(),
                            model = %model,
                            "Sweep deadline exceeded during request"
                        );
                        attempts.push(InvocationAttempt {
                            key_index: credential.index(),
                            model: model.clone(),
                            outcome: AttemptOutcome::TransportError(
                                "sweep deadline exceeded".to_string(),
                            ),
                        });
                        last_error = Some("sweep deadline exceeded".to_string());
                        break;
                    }
                },
                None => call.await,
            };

            match outcome {
                Ok(text) if is_valid(&text) => {
                    debug!(
                        key_index = credential.index(),
                        model = %model,
                        attempt = attempt + 1,
                        "LLM response accepted"
                    );
                    return (Ok(text), cursor);
                }
                Ok(_) => {
                    warn!(
                        key_index = credential.index(),
                        model = %model,
                        "LLM response rejected by validator"
                    );
                    attempts.push(InvocationAttempt {
                        key_index: credential.index(),
                        model: model.clone(),
                        outcome: AttemptOutcome::ValidationFailure,
                    });
                    last_error = Some(format!("response from {} failed validation", model));
                }
                Err(e) => {
                    let message = e.to_string();
                    let kind = classify_failure(&message);
                    warn!(
                        key_index = credential.index(),
                        model = %model,
                        kind = ?kind,
                        error = %message,
                        "LLM request failed"
                    );
                    attempts.push(InvocationAttempt {
                        key_index: credential.index(),
                        model: model.clone(),
                        outcome: AttemptOutcome::TransportError(message.clone()),
                    });
                    last_error = Some(message);

                    if kind == FailureKind::Transient && attempt + 1 < total {
                        transient_streak += 1;
                        let mut delay = self.backoff(transient_streak);
                        if let Some(d) = deadline {
                            delay = delay.min(d.saturating_duration_since(Instant::now()));
                        }
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }

            cursor.advance(dims);
        }

        let last_error = last_error.unwrap_or_else(|| "no attempts made".to_string());
        warn!(attempts = attempts.len(), error = %last_error, "All providers exhausted");
        (
            Err(LlmError::Exhausted {
                attempts,
                last_error,
            }),
            MatrixCursor::origin(),
        )
    }

    fn backoff(&self, streak: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(streak)
            .min(self.max_backoff)
    }
}
