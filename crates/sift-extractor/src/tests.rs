//! Integration tests for the extraction pipeline

#[cfg(test)]
mod tests {
    use crate::{ContentAnalyzer, EventStrategy, ExtractorConfig, ExtractorError, Pipeline};
    use async_trait::async_trait;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use proptest::prelude::*;
    use sift_domain::traits::PageFetcher;
    use sift_domain::{AnalysisOrigin, Category, EventType, WebsiteContent};
    use sift_fetch::{ContentAcquirer, FetchConfig};
    use sift_llm::{MockProvider, Orchestrator, ProviderMatrix};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    /// Serves canned markup, optionally slowly, and fails for unknown URLs
    struct CannedFetcher {
        pages: HashMap<String, (String, Duration)>,
    }

    impl CannedFetcher {
        fn new() -> Self {
            Self { pages: HashMap::new() }
        }

        fn page(mut self, url: &str, title: &str, delay_ms: u64) -> Self {
            let markup = format!("<html><head><title>{}</title></head><body></body></html>", title);
            self.pages
                .insert(url.to_string(), (markup, Duration::from_millis(delay_ms)));
            self
        }
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        type Error = String;

        async fn fetch(&self, url: &str) -> Result<String, String> {
            match self.pages.get(url) {
                Some((markup, delay)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(markup.clone())
                }
                None => Err(format!("connection refused: {}", url)),
            }
        }
    }

    fn orchestrator(provider: MockProvider) -> Arc<Orchestrator<MockProvider>> {
        let matrix = ProviderMatrix::new(vec!["key-a".into()], vec!["model-a".into()]).unwrap();
        Arc::new(Orchestrator::new(provider, matrix).with_backoff(Duration::ZERO, Duration::ZERO))
    }

    fn pipeline(
        provider: MockProvider,
        fetcher: CannedFetcher,
        config: ExtractorConfig,
    ) -> Pipeline<MockProvider, CannedFetcher> {
        let acquirer = ContentAcquirer::new(fetcher, FetchConfig::default());
        Pipeline::new(orchestrator(provider), acquirer, config).unwrap()
    }

    fn pattern_config() -> ExtractorConfig {
        ExtractorConfig {
            event_strategy: EventStrategy::Pattern,
            ..Default::default()
        }
    }

    fn taipei(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_two_urls_yield_records_in_url_order() {
        let fetcher = CannedFetcher::new()
            .page("https://slow.example.com/a", "Slow Page", 80)
            .page("https://fast.example.com/b", "Fast Page", 0);
        let pipeline = pipeline(MockProvider::failing("HTTP 503"), fetcher, pattern_config());

        let records = pipeline
            .process("先看 https://slow.example.com/a 再看 https://fast.example.com/b")
            .await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url.as_deref(), Some("https://slow.example.com/a"));
        assert_eq!(records[0].title, "Slow Page");
        assert_eq!(records[1].url.as_deref(), Some("https://fast.example.com/b"));
        assert_eq!(records[1].title, "Fast Page");
    }

    #[tokio::test]
    async fn test_check_out_two_sites_in_one_batch() {
        let summary = "Example Domain 是保留給文件與教學範例使用的網域，內容僅有一段說明文字，適合在撰寫技術文件時作為不會指向真實服務的示範連結。";
        let response = serde_json::json!([
            {"index": 0, "title": "Example Domain (com)", "category": "development", "tags": ["範例", "文件"], "summary": summary},
            {"index": 1, "title": "Example Domain (org)", "category": "development", "tags": ["範例", "文件"], "summary": summary},
        ])
        .to_string();
        let provider = MockProvider::new(response);
        let fetcher = CannedFetcher::new()
            .page("https://example.com", "Example Domain", 40)
            .page("https://example.org", "Example Domain", 0);
        let pipeline = pipeline(provider.clone(), fetcher, pattern_config());

        let records = pipeline
            .process("Check out https://example.com and https://example.org")
            .await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url.as_deref(), Some("https://example.com"));
        assert_eq!(records[0].title, "Example Domain (com)");
        assert_eq!(records[1].url.as_deref(), Some("https://example.org"));
        assert_eq!(records[1].title, "Example Domain (org)");
        assert!(records.iter().all(|r| r.origin == AnalysisOrigin::Classified));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_single_cell_degrades_to_heuristics() {
        let provider = MockProvider::failing("rate limit exceeded");
        let pipeline = pipeline(provider.clone(), CannedFetcher::new(), pattern_config());

        let records = pipeline.process("https://unreachable.example.org").await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin, AnalysisOrigin::HeuristicFallback);
        assert!(records[0].summary.contains("unreachable.example.org"));
        assert!(records[0].tags.len() >= 2);
        // one cell, one cycle
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_bare_domain_is_fetched_over_https() {
        let fetcher = CannedFetcher::new().page("https://figma.com", "Figma", 0);
        let pipeline = pipeline(MockProvider::failing("quota"), fetcher, pattern_config());

        let records = pipeline.process("試試 figma.com").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url.as_deref(), Some("https://figma.com"));
        assert_eq!(records[0].title, "Figma");
    }

    #[tokio::test]
    async fn test_text_message_yields_one_record_without_url() {
        let response = serde_json::json!({
            "title": "設計稿討論",
            "category": "productivity",
            "tags": ["會議", "設計稿"],
            "summary": "週四與設計團隊一起檢視新版首頁設計稿，確認配色、字級與互動細節，整理需要修改的項目並排定下週的修改時程與負責人，會後寄出會議紀錄。",
        })
        .to_string();
        let pipeline = pipeline(MockProvider::new(response), CannedFetcher::new(), pattern_config());

        let records = pipeline.process("週四跟設計團隊討論首頁設計稿").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, None);
        assert_eq!(records[0].category, Category::Productivity);
        assert_eq!(records[0].origin, AnalysisOrigin::Classified);
    }

    #[tokio::test]
    async fn test_registration_deadline_through_pipeline() {
        let pipeline = pipeline(MockProvider::failing("quota"), CannedFetcher::new(), pattern_config());

        let records = pipeline
            .process_at("報名截止 2025/07/01 23:59", taipei(2025, 3, 1, 9, 0))
            .await;

        assert_eq!(records.len(), 1);
        let events = &records[0].events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Deadline);
        assert_eq!(events[0].date_time, taipei(2025, 7, 1, 23, 59));
    }

    #[tokio::test]
    async fn test_events_are_strictly_future() {
        let pipeline = pipeline(MockProvider::failing("quota"), CannedFetcher::new(), pattern_config());
        let now = taipei(2025, 7, 1, 23, 59);

        let records = pipeline
            .process_at("截止 2025/07/01 23:59，開始 2025/07/02 09:00，結束 2025/06/01", now)
            .await;

        let events = &records[0].events;
        assert_eq!(events.len(), 1);
        assert!(events.iter().all(|e| e.is_after(&now)));
    }

    #[tokio::test]
    async fn test_llm_events_fall_back_to_patterns_on_exhaustion() {
        let provider = MockProvider::failing("HTTP 429");
        let pipeline = pipeline(provider.clone(), CannedFetcher::new(), ExtractorConfig::default());

        let records = pipeline
            .process_at("工作坊 2025/09/10 開始報名", taipei(2025, 3, 1, 9, 0))
            .await;

        assert_eq!(records[0].events.len(), 1);
        assert_eq!(records[0].events[0].event_type, EventType::Registration);
        // analysis and events each sweep the single cell once
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_message_yields_nothing() {
        let provider = MockProvider::default();
        let pipeline = pipeline(provider.clone(), CannedFetcher::new(), pattern_config());

        assert!(pipeline.process("   \n ").await.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let acquirer = ContentAcquirer::new(CannedFetcher::new(), FetchConfig::default());
        let config = ExtractorConfig {
            batch_size: 0,
            ..Default::default()
        };

        let result = Pipeline::new(orchestrator(MockProvider::default()), acquirer, config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[tokio::test]
    async fn test_analyze_single_is_idempotent() {
        let response = serde_json::json!({
            "title": "Notion",
            "category": "生產力",
            "tags": ["筆記", "Wiki", "筆記"],
            "summary": "Notion 是整合筆記、知識庫與專案管理的協作工作空間，支援資料庫、看板、日曆與多種範本，適合個人整理資料，也方便團隊共享文件與追蹤進度。",
        })
        .to_string();
        let analyzer = ContentAnalyzer::new(orchestrator(MockProvider::new(response)), ExtractorConfig::default());
        let content = WebsiteContent::stub("https://notion.so", "notion.so");

        let first = analyzer.analyze_single(&content).await;
        let second = analyzer.analyze_single(&content).await;

        assert_eq!(first.category, second.category);
        assert_eq!(first.tags, second.tags);
        assert_eq!(first.category, Category::Productivity);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_category_always_in_closed_set(category in ".{0,20}", title in "[a-zA-Z]{1,12}") {
            let response = serde_json::json!({
                "title": title,
                "category": category,
                "tags": ["a", "b"],
                "summary": "x",
            })
            .to_string();
            let analyzer = ContentAnalyzer::new(
                orchestrator(MockProvider::new(response)),
                ExtractorConfig::fast(),
            );
            let content = WebsiteContent::stub("https://example.com", "example.com");

            let result = tokio_test::block_on(analyzer.analyze_single(&content));
            prop_assert!(Category::ALL.contains(&result.category));
            prop_assert!(result.summary.chars().count() <= 150);
        }
    }
}
