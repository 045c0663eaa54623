//! End-to-end processing of one inbound message

use crate::analyzer::ContentAnalyzer;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::events::EventExtractor;
use chrono::{DateTime, FixedOffset, Utc};
use sift_domain::traits::{LlmProvider, PageFetcher};
use sift_domain::{ExtractedRecord, ExtractionRequest, WebsiteContent};
use sift_fetch::{detect_urls, ContentAcquirer};
use sift_llm::Orchestrator;
use std::sync::Arc;
use tracing::{debug, info};

/// Message in, ordered records out
///
/// URL detection picks the path (plain text, one link, many links); pages
/// are fetched, analyzed and scanned for events. Upstream and model
/// failures never surface here; they degrade into stub content and
/// heuristic results instead.
pub struct Pipeline<P, F> {
    analyzer: ContentAnalyzer<P>,
    events: EventExtractor<P>,
    acquirer: ContentAcquirer<F>,
    config: ExtractorConfig,
}

impl<P: LlmProvider, F: PageFetcher> Pipeline<P, F> {
    /// Build a pipeline; fails only on invalid configuration
    pub fn new(
        orchestrator: Arc<Orchestrator<P>>,
        acquirer: ContentAcquirer<F>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        acquirer.config().validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            analyzer: ContentAnalyzer::new(Arc::clone(&orchestrator), config.clone()),
            events: EventExtractor::new(orchestrator, config.clone()),
            acquirer,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Process a message relative to the current time
    pub async fn process(&self, text: &str) -> Vec<ExtractedRecord> {
        let now = Utc::now().with_timezone(&self.config.utc_offset());
        self.process_at(text, now).await
    }

    /// Process a message relative to `now`
    pub async fn process_at(&self, text: &str, now: DateTime<FixedOffset>) -> Vec<ExtractedRecord> {
        if text.trim().is_empty() {
            debug!("Ignoring empty message");
            return Vec::new();
        }

        let request = ExtractionRequest::from_message(text, detect_urls(text));
        info!(kind = request.kind(), "Processing message");

        let (contents, analyses) = match request {
            ExtractionRequest::Text { body } => {
                let content = WebsiteContent::from_text(&body);
                let analysis = self.analyzer.analyze_single(&content).await;
                (vec![content], vec![analysis])
            }
            ExtractionRequest::Url { address } => {
                let content = self.acquirer.fetch_one(&address).await;
                let analysis = self.analyzer.analyze_single(&content).await;
                (vec![content], vec![analysis])
            }
            ExtractionRequest::UrlBatch { addresses } => {
                let contents = self.acquirer.fetch_many(&addresses).await;
                let analyses = self.analyzer.analyze_many(&contents).await;
                (contents, analyses)
            }
        };

        let mut records = Vec::with_capacity(contents.len());
        for (content, analysis) in contents.iter().zip(analyses) {
            let events = self.events.extract(content, &now).await;
            let url = content.is_web().then(|| content.url.clone());
            records.push(ExtractedRecord::new(analysis, url, events));
        }

        info!(
            records = records.len(),
            events = records.iter().map(|r| r.events.len()).sum::<usize>(),
            "Message processed"
        );
        records
    }
}
