//! Sift Extractor
//!
//! Turns fetched pages and plain messages into categorized, summarized
//! records with calendar events attached.
//!
//! # Architecture
//!
//! ```text
//! message → detect URLs → fetch → ContentAnalyzer ─┐
//!                                 EventExtractor ──┴→ ExtractedRecord
//!                                      │
//!                                 Orchestrator (credential × model sweep)
//! ```
//!
//! Model answers go through a fixed chain of repairs (category coercion,
//! tag normalisation and backfill, summary gate, truncation). When the
//! orchestrator runs out of cells the analyzer answers from keyword
//! heuristics and the event extractor from date patterns, so a message
//! always yields records.
//!
//! # Example Usage
//!
//! ```no_run
//! use sift_extractor::{ExtractorConfig, Pipeline};
//! use sift_fetch::{ContentAcquirer, FetchConfig};
//! use sift_llm::{MockProvider, Orchestrator, ProviderMatrix};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let matrix = ProviderMatrix::new(vec!["key".into()], vec!["gemini-2.0-flash".into()])?;
//! let orchestrator = Arc::new(Orchestrator::new(MockProvider::default(), matrix));
//! let acquirer = ContentAcquirer::http(FetchConfig::default())?;
//!
//! let pipeline = Pipeline::new(orchestrator, acquirer, ExtractorConfig::default())?;
//! for record in pipeline.process("看看 figma.com 和 notion.so").await {
//!     println!("[{}] {} - {}", record.category, record.title, record.summary);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod batching;
mod config;
mod dates;
mod error;
mod events;
mod heuristics;
mod normalize;
mod parser;
mod pipeline;
mod prompt;

#[cfg(test)]
mod tests;

pub use analyzer::ContentAnalyzer;
pub use batching::Batcher;
pub use config::{EventStrategy, ExtractorConfig};
pub use dates::{find_dates, DateMatch};
pub use error::ExtractorError;
pub use events::{classify_window, default_time, parse_event_datetime, pattern_events, EventExtractor};
pub use heuristics::{classify, heuristic_analysis};
pub use normalize::{normalize_tags, summary_is_acceptable, template_summary, truncate_summary};
pub use pipeline::Pipeline;
