//! Category module - the closed classification set

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of an extracted record
///
/// The set is closed: anything a model produces outside of it is coerced
/// to [`Category::Other`] by [`Category::coerce`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// AI products, assistants and model tooling
    AiTools,

    /// Visual, UI/UX and creative resources
    Design,

    /// Software development tools and references
    Development,

    /// Data analysis, dashboards and databases
    Data,

    /// Personal and team productivity
    Productivity,

    /// Courses, tutorials and learning material
    Learning,

    /// News, articles and industry commentary
    News,

    /// Events, talks and anything with a sign-up
    Event,

    /// Everything else
    #[default]
    Other,
}

impl Category {
    /// All categories, in the order they are presented to the model
    pub const ALL: [Category; 9] = [
        Category::AiTools,
        Category::Design,
        Category::Development,
        Category::Data,
        Category::Productivity,
        Category::Learning,
        Category::News,
        Category::Event,
        Category::Other,
    ];

    /// Stable machine name (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AiTools => "ai_tools",
            Category::Design => "design",
            Category::Development => "development",
            Category::Data => "data",
            Category::Productivity => "productivity",
            Category::Learning => "learning",
            Category::News => "news",
            Category::Event => "event",
            Category::Other => "other",
        }
    }

    /// Human-facing label used in prompts and replies
    pub fn label(&self) -> &'static str {
        match self {
            Category::AiTools => "AI工具",
            Category::Design => "設計",
            Category::Development => "開發",
            Category::Data => "數據分析",
            Category::Productivity => "生產力",
            Category::Learning => "學習資源",
            Category::News => "新聞資訊",
            Category::Event => "活動",
            Category::Other => "其他",
        }
    }

    /// Default tag pool, most representative first
    pub fn default_tags(&self) -> &'static [&'static str] {
        match self {
            Category::AiTools => &["AI", "人工智慧", "生成式AI", "自動化", "機器學習"],
            Category::Design => &["設計", "UI/UX", "視覺", "素材", "創意"],
            Category::Development => &["開發", "程式設計", "開源", "API", "工程"],
            Category::Data => &["數據", "分析", "視覺化", "資料庫", "商業智慧"],
            Category::Productivity => &["效率", "生產力", "協作", "工作流程", "筆記"],
            Category::Learning => &["學習", "教學", "課程", "知識", "教育"],
            Category::News => &["新聞", "資訊", "趨勢", "產業動態", "評論"],
            Category::Event => &["活動", "報名", "講座", "社群", "研討會"],
            Category::Other => &["網站", "資源", "工具", "參考", "收藏"],
        }
    }

    /// Parse a category from its machine name or its label
    ///
    /// Matching ignores case, surrounding whitespace, and the difference
    /// between `-`, ` ` and `_` in machine names.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.to_lowercase().replace(['-', ' '], "_");

        Self::ALL.into_iter().find(|category| {
            category.as_str() == normalized || category.label().eq_ignore_ascii_case(trimmed)
        })
    }

    /// Coerce an arbitrary model output into the closed set
    pub fn coerce(s: &str) -> Self {
        Self::parse(s).unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}
