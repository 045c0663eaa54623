//! Record module - what leaves the pipeline

use crate::{AnalysisOrigin, AnalysisResult, CalendarEvent, Category};
use serde::{Deserialize, Serialize};

/// One extracted record, ready for the persistence collaborator
///
/// Field names are part of the output contract and do not change with the
/// storage schema on the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Category from the closed set
    pub category: Category,

    /// Descriptive tags
    pub tags: Vec<String>,

    /// Short title
    pub title: String,

    /// Length-bounded summary
    pub summary: String,

    /// Source link, when the record came from one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,

    /// Future events found in the same content
    #[serde(default)]
    pub events: Vec<CalendarEvent>,

    /// Whether a model or the heuristics classified this record
    pub origin: AnalysisOrigin,
}

impl ExtractedRecord {
    /// Combine an analysis with its source link and events
    pub fn new(analysis: AnalysisResult, url: Option<String>, events: Vec<CalendarEvent>) -> Self {
        Self {
            category: analysis.category,
            tags: analysis.tags,
            title: analysis.title,
            summary: analysis.summary,
            url,
            events,
            origin: analysis.origin,
        }
    }
}

/// Result of handing one record to a persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// A new entry was written
    Created {
        /// Link to the new entry, if the collaborator has one
        #[serde(skip_serializing_if = "Option::is_none", default)]
        location: Option<String>,
    },

    /// An entry with the same URL was already present
    AlreadyExists,

    /// The write failed
    Failed {
        /// Collaborator-provided reason
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_analysis() {
        let analysis = AnalysisResult {
            title: "Example".into(),
            category: Category::Other,
            tags: vec!["網站".into(), "資源".into()],
            summary: "example.com 提供的參考資源".into(),
            origin: AnalysisOrigin::Classified,
        };
        let record = ExtractedRecord::new(analysis, Some("https://example.com".into()), vec![]);
        assert_eq!(record.title, "Example");
        assert_eq!(record.url.as_deref(), Some("https://example.com"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category"], "other");
        assert_eq!(json["events"], serde_json::json!([]));
    }

    #[test]
    fn test_save_outcome_is_tagged() {
        let json = serde_json::to_value(SaveOutcome::AlreadyExists).unwrap();
        assert_eq!(json["status"], "already_exists");
    }
}
