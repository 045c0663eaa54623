//! LLM prompt engineering for content analysis and event extraction

use chrono::{DateTime, FixedOffset};
use sift_domain::{Category, EventType, WebsiteContent};
use sift_fetch::html::truncate_chars;

/// Builds prompts for the analyzer and the event extractor
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    excerpt_chars: usize,
    summary_min_chars: usize,
    summary_max_chars: usize,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(excerpt_chars: usize, summary_min_chars: usize, summary_max_chars: usize) -> Self {
        Self {
            excerpt_chars,
            summary_min_chars,
            summary_max_chars,
        }
    }

    /// Prompt asking for one JSON object describing `content`
    pub fn analysis(&self, content: &WebsiteContent) -> String {
        let mut prompt = String::new();

        prompt.push_str(ANALYSIS_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&self.category_section());
        prompt.push_str(&self.summary_rules());

        prompt.push_str("Content to analyze:\n---\n");
        prompt.push_str(&self.describe(content));
        prompt.push_str("---\n\n");

        prompt.push_str(SINGLE_OUTPUT_FORMAT);
        prompt
    }

    /// Prompt asking for one JSON array entry per item, tagged with `index`
    pub fn batch(&self, contents: &[WebsiteContent]) -> String {
        let mut prompt = String::new();

        prompt.push_str(BATCH_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&self.category_section());
        prompt.push_str(&self.summary_rules());

        for (index, content) in contents.iter().enumerate() {
            prompt.push_str(&format!("[{}]\n", index));
            prompt.push_str(&self.describe(content));
            prompt.push('\n');
        }

        prompt.push_str(&format!(
            "Return exactly {} entries, one per item, in the same order.\n\n",
            contents.len()
        ));
        prompt.push_str(BATCH_OUTPUT_FORMAT);
        prompt
    }

    /// Follow-up prompt when a summary was too short or generic
    pub fn summary_retry(&self, content: &WebsiteContent, rejected: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "The summary \"{}\" is too short or too generic.\n",
            rejected.trim()
        ));
        prompt.push_str(&format!(
            "Write one new summary in Traditional Chinese, {} to {} characters long.\n",
            self.summary_min_chars,
            self.summary_max_chars
        ));
        prompt.push_str(
            "Name what the site or note actually offers and who it is for. \
             Do not start with \"這是一個網站\" and do not use vague phrases such as \
             \"提供各種資訊\".\n\n",
        );

        prompt.push_str("Content:\n---\n");
        prompt.push_str(&self.describe(content));
        prompt.push_str("---\n\n");

        prompt.push_str("Output only the summary text, no JSON, no quotes.");
        prompt
    }

    /// Prompt asking for a JSON array of future events
    pub fn events(&self, content: &WebsiteContent, now: &DateTime<FixedOffset>) -> String {
        let mut prompt = String::new();

        prompt.push_str(EVENT_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Current time: {}\n", now.to_rfc3339()));
        prompt.push_str("Event types:\n");
        for event_type in EventType::ALL {
            prompt.push_str(&format!("- {} ({})\n", event_type.as_str(), event_type.label()));
        }
        prompt.push('\n');

        prompt.push_str("Content:\n---\n");
        prompt.push_str(&self.describe(content));
        prompt.push_str("---\n\n");

        prompt.push_str(EVENT_OUTPUT_FORMAT);
        prompt
    }

    fn category_section(&self) -> String {
        let mut section = String::from("Categories (use the key):\n");
        for category in Category::ALL {
            section.push_str(&format!("- {} ({})\n", category.as_str(), category.label()));
        }
        section.push('\n');
        section
    }

    fn summary_rules(&self) -> String {
        format!(
            "Summary: one sentence in Traditional Chinese, {} to {} characters, \
             concrete about what is offered.\nTags: 2 to 8 short tags, not repeating the category.\n\n",
            self.summary_min_chars,
            self.summary_max_chars
        )
    }

    fn describe(&self, content: &WebsiteContent) -> String {
        let mut out = String::new();

        if !content.url.is_empty() {
            out.push_str(&format!("URL: {}\n", content.url));
        }
        out.push_str(&format!("Title: {}\n", content.title));
        push_field(&mut out, "Description", &content.description);
        push_field(&mut out, "Keywords", &content.keywords);
        push_field(&mut out, "Author", &content.author);
        if !content.headings.is_empty() {
            out.push_str(&format!("Headings: {}\n", content.headings.join(" | ")));
        }
        if !content.nav_links.is_empty() {
            out.push_str(&format!("Navigation: {}\n", content.nav_links.join(" | ")));
        }
        let excerpt = truncate_chars(&content.raw_content_excerpt, self.excerpt_chars);
        push_field(&mut out, "Text", &excerpt);

        out
    }
}

fn push_field(out: &mut String, name: &str, value: &str) {
    if !value.trim().is_empty() {
        out.push_str(&format!("{}: {}\n", name, value.trim()));
    }
}

const ANALYSIS_INSTRUCTIONS: &str = "Classify the following content and describe it for a personal knowledge base.";

const BATCH_INSTRUCTIONS: &str = "Classify each of the following items and describe it for a personal knowledge base. \
Items are numbered [0], [1], ...";

const SINGLE_OUTPUT_FORMAT: &str = r#"Output format (one JSON object only, no additional text):
{
  "title": "short title",
  "category": "category key",
  "tags": ["tag", "tag"],
  "summary": "one sentence"
}"#;

const BATCH_OUTPUT_FORMAT: &str = r#"Output format (JSON array only, no additional text):
[
  {
    "index": 0,
    "title": "short title",
    "category": "category key",
    "tags": ["tag", "tag"],
    "summary": "one sentence"
  }
]"#;

const EVENT_INSTRUCTIONS: &str = "Find dated events in the following content that a reader may want in a calendar \
(deadlines, registration dates, meetings, start and end dates). \
Only include events that are later than the current time. Use the content's local time zone.";

const EVENT_OUTPUT_FORMAT: &str = r#"Output format (JSON array only, empty array if there are none):
[
  {
    "title": "what happens",
    "type": "event type key",
    "iso_datetime": "YYYY-MM-DDTHH:MM:SS+08:00",
    "description": "one line of context"
  }
]"#;
