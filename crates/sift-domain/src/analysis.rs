//! Analysis module - classification and summary for one item

use crate::Category;
use serde::{Deserialize, Serialize};

/// Where an analysis came from
///
/// Callers (and tests) can tell a model-derived result from a rule-based
/// one without inspecting the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOrigin {
    /// Produced by a language model and repaired by the analyzer
    Classified,

    /// Produced by keyword heuristics because no model answer was usable
    HeuristicFallback,
}

/// Title, category, tags and summary for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Short title
    pub title: String,

    /// Member of the closed category set
    pub category: Category,

    /// Two to eight descriptive tags
    pub tags: Vec<String>,

    /// One-sentence summary, length-bounded
    pub summary: String,

    /// How this result was produced
    pub origin: AnalysisOrigin,
}

impl AnalysisResult {
    /// Whether a language model produced this result
    pub fn is_classified(&self) -> bool {
        self.origin == AnalysisOrigin::Classified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_serializes_snake_case() {
        let result = AnalysisResult {
            title: "Figma".into(),
            category: Category::Design,
            tags: vec!["設計".into(), "UI/UX".into()],
            summary: "協作式介面設計工具".into(),
            origin: AnalysisOrigin::HeuristicFallback,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["origin"], "heuristic_fallback");
        assert_eq!(json["category"], "design");
        assert!(!result.is_classified());
    }
}
