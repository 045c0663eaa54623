//! Sift Domain Layer
//!
//! This crate contains the value types shared by every Sift crate and the
//! trait seams through which the pipeline talks to the outside world.
//! It carries no I/O.
//!
//! ## Key Concepts
//!
//! - **Category**: The closed set of classifications a record can carry
//! - **WebsiteContent**: What was learned about a page (or a plain message)
//! - **AnalysisResult**: Title, category, tags and summary for one item
//! - **CalendarEvent**: A dated, future event derived from the same content
//! - **ExtractedRecord**: The combined record handed to outbound collaborators
//!
//! ## Architecture
//!
//! Infrastructure lives in other crates:
//! - `sift-llm` implements [`traits::LlmProvider`]
//! - `sift-fetch` implements [`traits::PageFetcher`]
//! - the CLI (or any host application) implements the sinks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod category;
pub mod content;
pub mod event;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use analysis::{AnalysisOrigin, AnalysisResult};
pub use category::Category;
pub use content::{ExtractionRequest, WebsiteContent};
pub use event::{CalendarEvent, EventType};
pub use record::{ExtractedRecord, SaveOutcome};
