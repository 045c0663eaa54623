//! Gemini Provider Implementation
//!
//! Talks to Google's Generative Language REST API (`generateContent`).
//!
//! The provider makes exactly one HTTP request per call. Retrying, key
//! rotation and model fallback are the orchestrator's job, so errors are
//! mapped to `LlmError` variants whose text the orchestrator can classify.
//!
//! # Examples
//!
//! ```no_run
//! use sift_llm::GeminiProvider;
//! use sift_domain::traits::LlmProvider;
//!
//! # async fn demo() -> Result<(), sift_llm::LlmError> {
//! let provider = GeminiProvider::new(std::time::Duration::from_secs(15))?;
//! let text = provider.generate("AIza...", "gemini-2.0-flash", "Say hi").await?;
//! # Ok(())
//! # }
//! ```

use crate::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_domain::traits::LlmProvider as LlmProviderTrait;
use std::time::Duration;
use tracing::debug;

/// Default API base
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default timeout for LLM requests (15 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Gemini API provider
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    endpoint: String,
    client: reqwest::Client,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
    /// Create a provider against the public endpoint
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, timeout)
    }

    /// Create a provider against a custom base URL
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
            temperature: 0.2,
        })
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn request(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, model);

        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Communication(format!("Request timed out: {}", e))
                } else {
                    LlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                429 => LlmError::RateLimitExceeded(format!("HTTP 429: {}", error_text)),
                401 | 403 => {
                    LlmError::Unauthorized(format!("HTTP {}: {}", status.as_u16(), error_text))
                }
                404 => LlmError::ModelNotAvailable(model.to_string()),
                _ => LlmError::Communication(format!("HTTP {}: {}", status, error_text)),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse("empty candidate".to_string()));
        }

        debug!(model, chars = text.len(), "Gemini response received");
        Ok(text)
    }
}

#[async_trait]
impl LlmProviderTrait for GeminiProvider {
    type Error = LlmError;

    async fn generate(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, Self::Error> {
        self.request(api_key, model, prompt).await
    }
}
