//! Repair stages applied to every model answer
//!
//! parse → category coercion → tag normalisation/backfill → summary gate
//! → truncation

use crate::config::ExtractorConfig;
use sift_domain::{Category, WebsiteContent};
use std::collections::HashSet;

/// Phrases that mark a summary as filler regardless of its length
const GENERIC_PHRASES: &[&str] = &[
    "這是一個網站",
    "這個網站",
    "一個網站",
    "提供各種",
    "相關資訊",
    "各種資訊",
    "this website",
    "this site",
    "a website",
    "welcome to",
    "various",
    "n/a",
];

/// Trim, dedupe (case-insensitively), drop the category itself, cap, and
/// backfill from the category's default pool when too few remain
pub fn normalize_tags(raw: &[String], category: Category, config: &ExtractorConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();

    let is_category_name = |tag: &str| {
        tag.eq_ignore_ascii_case(category.label()) || tag.eq_ignore_ascii_case(category.as_str())
    };

    for tag in raw {
        if tags.len() >= config.max_tags {
            break;
        }
        let tag = tag.trim().trim_start_matches('#').trim();
        if tag.is_empty() || is_category_name(tag) {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            tags.push(tag.to_string());
        }
    }

    if tags.len() < config.min_tags {
        for tag in category.default_tags() {
            if tags.len() >= config.tag_backfill_target {
                break;
            }
            if !is_category_name(tag) && seen.insert(tag.to_lowercase()) {
                tags.push(tag.to_string());
            }
        }
    }

    tags
}

/// Whether a summary is filler
pub fn is_generic_summary(summary: &str) -> bool {
    let lowered = summary.trim().to_lowercase();
    GENERIC_PHRASES.iter().any(|p| lowered.contains(p))
}

/// Whether a summary passes the quality gate
pub fn summary_is_acceptable(summary: &str, config: &ExtractorConfig) -> bool {
    summary.trim().chars().count() >= config.summary_min_chars && !is_generic_summary(summary)
}

/// Strip quotes, fences and labels a model may wrap around a bare summary
pub fn clean_summary(response: &str) -> String {
    let mut text = response.trim();
    text = text.trim_start_matches("```").trim_end_matches("```").trim();
    for prefix in ["summary:", "Summary:", "摘要：", "摘要:"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim();
        }
    }
    text.trim_matches(|c| c == '"' || c == '「' || c == '」' || c == '“' || c == '”')
        .trim()
        .to_string()
}

/// Hard-truncate to `max` characters, marking the cut with `…`
pub fn truncate_summary(summary: &str, max: usize) -> String {
    let summary = summary.trim();
    if summary.chars().count() <= max {
        return summary.to_string();
    }
    let mut cut: String = summary.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Name a summary should lead with: the host for links, the title for text
pub fn subject_name(content: &WebsiteContent) -> &str {
    if !content.host.is_empty() {
        &content.host
    } else {
        content.display_name()
    }
}

/// Sentences appended to a template that is still under the minimum
const TEMPLATE_FILLERS: &[&str] = &[
    "內容已收藏，可稍後再查看完整資訊。",
    "建議開啟連結了解更多細節與最新內容。",
];

/// Last-resort summary keyed by category
///
/// The result always lies within `summary_min_chars..=summary_max_chars`
/// for a valid configuration. The page description is used only when it
/// passes the gate on its own.
pub fn template_summary(content: &WebsiteContent, category: Category, config: &ExtractorConfig) -> String {
    let name = subject_name(content);

    let description = content.description.trim();
    if !description.is_empty() {
        let described = format!("{}：{}", name, description);
        if summary_is_acceptable(&described, config) {
            return truncate_summary(&described, config.summary_max_chars);
        }
    }

    let mut summary = category_template(name, category);
    for filler in TEMPLATE_FILLERS.iter().cycle() {
        if summary.trim().chars().count() >= config.summary_min_chars {
            break;
        }
        summary.push_str(filler);
    }
    truncate_summary(&summary, config.summary_max_chars)
}

fn category_template(name: &str, category: Category) -> String {
    match category {
        Category::AiTools => format!("{} 是一個 AI 工具，運用人工智慧協助自動化處理、內容生成與資料整理，適合用來簡化重複性的工作流程，提升日常工作效率。", name),
        Category::Design => format!("{} 是設計相關資源，提供介面範例、視覺素材或創意靈感，協助設計師更快完成作品，也方便團隊建立一致的設計語言。", name),
        Category::Development => format!("{} 是開發相關資源，提供程式設計工具、開源專案或 API 文件，方便工程師查閱實作細節，加快開發與除錯的速度。", name),
        Category::Data => format!("{} 是數據分析相關工具，協助整理、清洗與視覺化資料，讓使用者更容易解讀數據背後的趨勢，作為決策的參考依據。", name),
        Category::Productivity => format!("{} 是生產力工具，協助管理待辦任務、筆記與團隊協作流程，讓個人與團隊的工作安排更有條理，減少遺漏與重工。", name),
        Category::Learning => format!("{} 是學習資源，提供線上課程、教學文章或知識內容，適合自學新技能與持續進修，可依照自己的步調安排學習進度。", name),
        Category::News => format!("{} 是新聞資訊來源，提供產業動態、趨勢分析與深度報導，方便快速掌握最新消息，了解所關注領域的重要變化。", name),
        Category::Event => format!("{} 是活動資訊，包含舉辦時間、地點、報名方式與參與資格等細節，適合加入行事曆追蹤，避免錯過報名與活動日期。", name),
        Category::Other => format!("{} 是收藏的參考資源，內容可能涵蓋工具、文章或服務介紹，先保留下來以便日後查閱、比較與整理成個人知識庫。", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractorConfig {
        ExtractorConfig::default()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tags_are_trimmed_and_deduped() {
        let tags = normalize_tags(&strings(&[" AI ", "ai", "#Agents", "", "Agents"]), Category::Design, &config());
        assert_eq!(tags, strings(&["AI", "Agents"]));
    }

    #[test]
    fn test_category_label_is_dropped() {
        let tags = normalize_tags(&strings(&["設計", "Figma", "design", "UI"]), Category::Design, &config());
        assert_eq!(tags, strings(&["Figma", "UI"]));
    }

    #[test]
    fn test_tags_are_capped() {
        let raw: Vec<String> = (0..20).map(|i| format!("t{}", i)).collect();
        assert_eq!(normalize_tags(&raw, Category::Other, &config()).len(), 8);
    }

    #[test]
    fn test_backfill_up_to_target() {
        let tags = normalize_tags(&strings(&["Figma"]), Category::Design, &config());
        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0], "Figma");
        assert!(!tags.contains(&"設計".to_string()));
    }

    #[test]
    fn test_backfill_skips_label_in_pool() {
        let tags = normalize_tags(&[], Category::Event, &config());
        assert_eq!(tags, strings(&["報名", "講座", "社群", "研討會"]));
    }

    #[test]
    fn test_no_backfill_when_enough() {
        let tags = normalize_tags(&strings(&["a", "b"]), Category::Other, &config());
        assert_eq!(tags, strings(&["a", "b"]));
    }

    #[test]
    fn test_summary_gate() {
        let cfg = config();
        assert!(!summary_is_acceptable("太短", &cfg));
        assert!(!summary_is_acceptable(
            "這是一個網站，提供各種相關資訊給使用者參考與使用，內容豐富多元值得一看。",
            &cfg
        ));
        assert!(summary_is_acceptable(
            "Figma 是瀏覽器上的協作式介面設計工具，支援即時多人編輯、原型製作與設計系統管理。",
            &cfg
        ));
    }

    #[test]
    fn test_clean_summary() {
        assert_eq!(clean_summary("  \"摘要：好工具\"  "), "摘要：好工具");
        assert_eq!(clean_summary("摘要：好工具"), "好工具");
        assert_eq!(clean_summary("「好工具」"), "好工具");
    }

    #[test]
    fn test_truncate_summary() {
        assert_eq!(truncate_summary("abc", 5), "abc");
        let cut = truncate_summary(&"字".repeat(200), 150);
        assert_eq!(cut.chars().count(), 150);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_template_leads_with_host() {
        let content = WebsiteContent::stub("https://example.com", "example.com");
        for category in Category::ALL {
            let summary = template_summary(&content, category, &config());
            assert!(summary.starts_with("example.com"));
            assert!(summary_is_acceptable(&summary, &config()), "{}", summary);
        }
    }

    #[test]
    fn test_template_prefers_long_description() {
        let mut content = WebsiteContent::stub("https://x.dev", "x.dev");
        content.description =
            "Fast build tool for web projects with instant dev server start and optimized production bundles".into();
        assert_eq!(
            template_summary(&content, Category::Development, &config()),
            format!("x.dev：{}", content.description)
        );
    }

    #[test]
    fn test_short_description_uses_category_template() {
        let mut content = WebsiteContent::stub("https://figma.com", "figma.com");
        content.description = "Fast".into();
        let summary = template_summary(&content, Category::Design, &config());
        assert!(!summary.contains("Fast"));
        assert!(summary.chars().count() >= config().summary_min_chars, "{}", summary);
    }

    #[test]
    fn test_template_pads_up_to_raised_minimum() {
        let config = ExtractorConfig {
            summary_min_chars: 140,
            ..ExtractorConfig::default()
        };
        let content = WebsiteContent::stub("https://a.io", "a.io");
        for category in Category::ALL {
            let count = template_summary(&content, category, &config).chars().count();
            assert!((140..=150).contains(&count), "{}", count);
        }
    }
}
