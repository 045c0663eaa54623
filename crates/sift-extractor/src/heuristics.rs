//! Keyword heuristics used when no model answer is usable
//!
//! Results from here always carry `AnalysisOrigin::HeuristicFallback`.

use crate::config::ExtractorConfig;
use crate::normalize::{normalize_tags, template_summary};
use sift_domain::{AnalysisOrigin, AnalysisResult, Category, WebsiteContent};

/// Vocabulary per category, in tie-break order
const VOCABULARY: &[(Category, &[&str])] = &[
    (
        Category::AiTools,
        &["ai", "gpt", "chatgpt", "llm", "openai", "gemini", "claude", "copilot", "machine learning",
          "人工智慧", "生成式", "機器學習", "大型語言模型"],
    ),
    (
        Category::Design,
        &["design", "figma", "ui", "ux", "typography", "icons", "dribbble", "behance",
          "設計", "配色", "字型", "素材"],
    ),
    (
        Category::Data,
        &["data", "analytics", "dashboard", "sql", "visualization", "statistics", "bi",
          "數據", "資料分析", "統計", "視覺化"],
    ),
    (
        Category::Development,
        &["github", "api", "sdk", "developer", "developers", "programming", "framework", "library",
          "open source", "rust", "javascript", "python", "開發", "程式", "開源", "工程師"],
    ),
    (
        Category::Learning,
        &["course", "courses", "tutorial", "learn", "learning", "lesson", "education",
          "課程", "教學", "學習", "講義"],
    ),
    (
        Category::Event,
        &["event", "conference", "meetup", "webinar", "summit", "hackathon",
          "活動", "報名", "研討會", "講座", "工作坊"],
    ),
    (
        Category::News,
        &["news", "headline", "breaking", "report", "新聞", "報導", "快訊", "頭條"],
    ),
    (
        Category::Productivity,
        &["productivity", "notion", "todo", "calendar", "workflow", "task", "notes",
          "生產力", "效率", "筆記", "待辦", "協作"],
    ),
];

/// Whether `keyword` occurs in `haystack` (already lowercased). ASCII
/// keywords must stand alone as words; CJK keywords match anywhere.
pub(crate) fn mentions(haystack: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return haystack.contains(keyword);
    }

    let is_word_byte = |b: u8| b.is_ascii_alphanumeric();
    let bytes = haystack.as_bytes();
    haystack.match_indices(keyword).any(|(start, _)| {
        let end = start + keyword.len();
        let before_ok = start == 0 || !is_word_byte(bytes[start - 1]);
        let after_ok = end == bytes.len() || !is_word_byte(bytes[end]);
        before_ok && after_ok
    })
}

/// Pick the category whose vocabulary appears most often; `Other` if none
pub fn classify(content: &WebsiteContent) -> Category {
    let haystack = content.combined_text().to_lowercase();

    let mut best = (Category::Other, 0usize);
    for (category, words) in VOCABULARY {
        let hits = words.iter().filter(|w| mentions(&haystack, w)).count();
        if hits > best.1 {
            best = (*category, hits);
        }
    }
    best.0
}

/// Full heuristic analysis for one item
pub fn heuristic_analysis(content: &WebsiteContent, config: &ExtractorConfig) -> AnalysisResult {
    let category = classify(content);

    let keyword_tags: Vec<String> = content
        .keywords
        .split([',', '，', '、', ';'])
        .map(str::to_string)
        .collect();
    let tags = normalize_tags(&keyword_tags, category, config);

    let summary = template_summary(content, category, config);

    AnalysisResult {
        title: content.display_name().to_string(),
        category,
        tags,
        summary,
        origin: AnalysisOrigin::HeuristicFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn page(host: &str, title: &str, description: &str) -> WebsiteContent {
        WebsiteContent {
            url: format!("https://{}", host),
            host: host.into(),
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_word_matching_for_ascii() {
        assert!(mentions("an ai assistant", "ai"));
        assert!(!mentions("send email daily", "ai"));
        assert!(!mentions("maintain", "ai"));
        assert!(mentions("ai-powered", "ai"));
        assert!(mentions("使用人工智慧", "人工智慧"));
    }

    #[test]
    fn test_classify_examples() {
        assert_eq!(
            classify(&page("openai.com", "ChatGPT", "An AI assistant by OpenAI")),
            Category::AiTools
        );
        assert_eq!(
            classify(&page("figma.com", "Figma", "The collaborative interface design tool")),
            Category::Design
        );
        assert_eq!(
            classify(&page("accupass.com", "AI 論壇 報名", "年度研討會活動，現正開放報名")),
            Category::Event
        );
        assert_eq!(classify(&page("example.com", "Example", "")), Category::Other);
    }

    #[test]
    fn test_heuristic_analysis_shape() {
        let mut content = page("example.com", "Example Domain", "");
        content.keywords = "reference, docs, reference".into();
        let config = ExtractorConfig::default();

        let result = heuristic_analysis(&content, &config);
        assert_eq!(result.origin, AnalysisOrigin::HeuristicFallback);
        assert_eq!(result.title, "Example Domain");
        assert_eq!(result.tags, vec!["reference", "docs"]);
        assert!(result.summary.contains("example.com"));
        assert!(result.summary.chars().count() <= config.summary_max_chars);
    }

    #[test]
    fn test_stub_falls_back_to_host_title() {
        let content = WebsiteContent::stub("https://unreachable.dev", "unreachable.dev");
        let result = heuristic_analysis(&content, &ExtractorConfig::default());
        assert_eq!(result.title, "unreachable.dev");
        assert!(result.tags.len() >= 2);
    }

    proptest! {
        #[test]
        fn prop_heuristic_result_is_well_formed(title in ".{0,40}", description in ".{0,80}") {
            let content = page("example.com", &title, &description);
            let config = ExtractorConfig::default();
            let result = heuristic_analysis(&content, &config);

            prop_assert!(Category::ALL.contains(&result.category));
            prop_assert!(result.tags.len() >= 2 && result.tags.len() <= 8);
            let count = result.summary.chars().count();
            prop_assert!(count >= config.summary_min_chars && count <= config.summary_max_chars);
        }
    }
}
