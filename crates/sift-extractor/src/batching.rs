//! Fixed-size batching of fetched pages
//!
//! Many pages are analyzed a batch at a time. Batches run one after another
//! and their results are concatenated back in input order.

use crate::analyzer::ContentAnalyzer;
use sift_domain::traits::LlmProvider;
use sift_domain::{AnalysisResult, WebsiteContent};
use std::ops::Range;
use tracing::debug;

/// Splits item lists into batches of at most `batch_size`
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    batch_size: usize,
}

impl Batcher {
    /// Create a new batcher; a zero size is treated as one
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Index ranges covering `0..len`, in order, each at most `batch_size` long
    pub fn ranges(&self, len: usize) -> Vec<Range<usize>> {
        (0..len)
            .step_by(self.batch_size)
            .map(|start| start..(start + self.batch_size).min(len))
            .collect()
    }
}

impl<P: LlmProvider> ContentAnalyzer<P> {
    /// Analyze any number of items, one batch call per `batch_size` items
    pub async fn analyze_many(&self, contents: &[WebsiteContent]) -> Vec<AnalysisResult> {
        let batcher = Batcher::new(self.config().batch_size);
        let ranges = batcher.ranges(contents.len());

        let mut results = Vec::with_capacity(contents.len());
        for (n, range) in ranges.iter().enumerate() {
            debug!(batch = n + 1, of = ranges.len(), items = range.len(), "Analyzing batch");
            results.extend(self.analyze_batch(&contents[range.clone()]).await);
        }
        results
    }
}
