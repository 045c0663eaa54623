//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and
//! infrastructure. Implementations live in other crates (or in the host
//! application, for the sinks).

use crate::{CalendarEvent, ExtractedRecord, SaveOutcome};
use async_trait::async_trait;
use std::fmt::Display;

/// Trait for language-model providers
///
/// One prompt in, one response text out. The credential and model are
/// chosen by the caller (the orchestrator), not by the provider.
///
/// Implemented by the infrastructure layer (sift-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: Display + Send;

    /// Generate a completion for `prompt` with the given key and model
    async fn generate(&self, api_key: &str, model: &str, prompt: &str)
        -> Result<String, Self::Error>;
}

/// Trait for retrieving raw page markup
///
/// Implemented by the infrastructure layer (sift-fetch)
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Error type for fetch operations
    type Error: Display + Send;

    /// Fetch the markup behind `url`
    async fn fetch(&self, url: &str) -> Result<String, Self::Error>;
}

/// Trait for the persistence collaborator
///
/// The collaborator owns field-name discovery and duplicate detection.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Error type for sink operations
    type Error: Display + Send;

    /// Persist records, returning one outcome per record in input order
    async fn save(&self, records: &[ExtractedRecord]) -> Result<Vec<SaveOutcome>, Self::Error>;
}

/// Trait for the calendar collaborator
///
/// Link and file generation for calendar entries belong to the collaborator.
#[async_trait]
pub trait CalendarSink: Send + Sync {
    /// Error type for calendar operations
    type Error: Display + Send;

    /// Add one event; returns a link to the created entry when there is one
    async fn add(&self, event: &CalendarEvent) -> Result<Option<String>, Self::Error>;
}
