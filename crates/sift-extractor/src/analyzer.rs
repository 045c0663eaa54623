//! Structured content analyzer
//!
//! Asks the model for title, category, tags and summary, then repairs the
//! answer until it meets the output contract. Never fails: exhaustion of
//! the orchestrator turns into a heuristic result.

use crate::config::ExtractorConfig;
use crate::heuristics::heuristic_analysis;
use crate::normalize::{
    clean_summary, normalize_tags, summary_is_acceptable, template_summary, truncate_summary,
};
use crate::parser::{self, RawAnalysis};
use crate::prompt::PromptBuilder;
use sift_domain::traits::LlmProvider;
use sift_domain::{AnalysisOrigin, AnalysisResult, Category, WebsiteContent};
use sift_llm::Orchestrator;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Classifies and summarises content through the orchestrator
pub struct ContentAnalyzer<P> {
    orchestrator: Arc<Orchestrator<P>>,
    config: ExtractorConfig,
    prompts: PromptBuilder,
}

impl<P: LlmProvider> ContentAnalyzer<P> {
    /// Create a new analyzer
    pub fn new(orchestrator: Arc<Orchestrator<P>>, config: ExtractorConfig) -> Self {
        let prompts = PromptBuilder::new(
            config.prompt_excerpt_chars,
            config.summary_min_chars,
            config.summary_max_chars,
        );
        Self {
            orchestrator,
            config,
            prompts,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Analyze one item
    pub async fn analyze_single(&self, content: &WebsiteContent) -> AnalysisResult {
        let prompt = self.prompts.analysis(content);
        debug!("Prompt length: {} chars", prompt.len());

        let response = match self.orchestrator.invoke(&prompt, parser::is_valid_analysis).await {
            Ok(response) => response,
            Err(e) => {
                warn!(item = %content.display_name(), error = %e, "Analysis exhausted, using heuristics");
                return heuristic_analysis(content, &self.config);
            }
        };

        match parser::parse_analysis(&response) {
            Ok(raw) => self.finish(content, raw).await,
            Err(e) => {
                warn!(error = %e, "Accepted analysis did not parse, using heuristics");
                heuristic_analysis(content, &self.config)
            }
        }
    }

    /// Analyze several items in one model call
    ///
    /// The output always has the same length and order as `contents`.
    /// Entries the model left out are filled with heuristic results.
    pub async fn analyze_batch(&self, contents: &[WebsiteContent]) -> Vec<AnalysisResult> {
        match contents {
            [] => return Vec::new(),
            [single] => return vec![self.analyze_single(single).await],
            _ => {}
        }

        let prompt = self.prompts.batch(contents);
        let entries = match self.orchestrator.invoke(&prompt, parser::is_valid_batch).await {
            Ok(response) => parser::parse_batch(&response).unwrap_or_else(|e| {
                warn!(error = %e, "Accepted batch did not parse");
                Vec::new()
            }),
            Err(e) => {
                warn!(items = contents.len(), error = %e, "Batch analysis exhausted, using heuristics");
                return contents
                    .iter()
                    .map(|c| heuristic_analysis(c, &self.config))
                    .collect();
            }
        };

        let mut slots = assign_entries(entries, contents.len());
        let mut results = Vec::with_capacity(contents.len());
        for (content, slot) in contents.iter().zip(slots.iter_mut()) {
            let result = match slot.take() {
                Some(raw) => self.finish(content, raw).await,
                None => {
                    debug!(item = %content.display_name(), "Missing batch entry, using heuristics");
                    heuristic_analysis(content, &self.config)
                }
            };
            results.push(result);
        }

        info!(
            items = contents.len(),
            classified = results.iter().filter(|r| r.is_classified()).count(),
            "Batch analyzed"
        );
        results
    }

    /// Repair a parsed answer into a full result
    async fn finish(&self, content: &WebsiteContent, raw: RawAnalysis) -> AnalysisResult {
        let category = Category::coerce(&raw.category);
        let tags = normalize_tags(&raw.tags, category, &self.config);
        let summary = self.gate_summary(content, category, raw.summary).await;

        AnalysisResult {
            title: raw.title,
            category,
            tags,
            summary: truncate_summary(&summary, self.config.summary_max_chars),
            origin: AnalysisOrigin::Classified,
        }
    }

    async fn gate_summary(&self, content: &WebsiteContent, category: Category, summary: String) -> String {
        if summary_is_acceptable(&summary, &self.config) {
            return summary;
        }

        if self.config.summary_retry {
            let prompt = self.prompts.summary_retry(content, &summary);
            let retried = self
                .orchestrator
                .invoke(&prompt, |r| !retry_summary_text(r).is_empty())
                .await;
            match retried {
                Ok(response) => {
                    let cleaned = retry_summary_text(&response);
                    if summary_is_acceptable(&cleaned, &self.config) {
                        return cleaned;
                    }
                    debug!(summary = %cleaned, "Regenerated summary still weak");
                }
                Err(e) => debug!(error = %e, "Summary regeneration exhausted"),
            }
        }

        template_summary(content, category, &self.config)
    }
}

/// Summary text from a regeneration answer; models sometimes answer with
/// JSON even when asked for plain text
fn retry_summary_text(response: &str) -> String {
    match parser::parse_value(response) {
        Ok(value) if value.is_object() => value
            .get("summary")
            .and_then(|s| s.as_str())
            .map(clean_summary)
            .unwrap_or_default(),
        _ => clean_summary(response),
    }
}

/// Place batch entries into input slots: by explicit index when every
/// entry carries a distinct, in-range one, by position otherwise
fn assign_entries(entries: Vec<RawAnalysis>, len: usize) -> Vec<Option<RawAnalysis>> {
    let mut slots: Vec<Option<RawAnalysis>> = (0..len).map(|_| None).collect();

    let mut seen = HashSet::new();
    let indexed = !entries.is_empty()
        && entries
            .iter()
            .all(|e| e.index.is_some_and(|i| i < len && seen.insert(i)));

    if indexed {
        for entry in entries {
            if let Some(i) = entry.index {
                slots[i] = Some(entry);
            }
        }
    } else {
        for (slot, entry) in slots.iter_mut().zip(entries) {
            *slot = Some(entry);
        }
    }

    slots
}
