//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde::Serialize;
use sift_domain::{CalendarEvent, ExtractedRecord, SaveOutcome, WebsiteContent};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// One record after it went through the sinks.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedItem {
    /// The extracted record
    pub record: ExtractedRecord,

    /// What the record sink did with it
    pub outcome: SaveOutcome,

    /// Calendar link per event, in event order
    pub calendar_links: Vec<Option<String>>,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format processing results.
    pub fn format_items(&self, items: &[ProcessedItem]) -> Result<String> {
        match self.format {
            OutputFormat::Reply => Ok(self.format_reply(items)),
            OutputFormat::Table => Ok(self.format_items_table(items)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        }
    }

    /// Chat-style reply: a summary line, records grouped by outcome, then events.
    fn format_reply(&self, items: &[ProcessedItem]) -> String {
        if items.is_empty() {
            return self.warning("沒有可處理的內容。");
        }

        let created: Vec<&ProcessedItem> = items
            .iter()
            .filter(|i| matches!(i.outcome, SaveOutcome::Created { .. }))
            .collect();
        let existing: Vec<&ProcessedItem> = items
            .iter()
            .filter(|i| i.outcome == SaveOutcome::AlreadyExists)
            .collect();
        let failed: Vec<&ProcessedItem> = items
            .iter()
            .filter(|i| matches!(i.outcome, SaveOutcome::Failed { .. }))
            .collect();

        let mut reply = format!(
            "已處理 {} 個項目：新增 {}、已存在 {}、失敗 {}\n",
            items.len(),
            created.len(),
            existing.len(),
            failed.len()
        );

        if !created.is_empty() {
            reply.push_str(&format!("\n{}\n", self.colorize("✅ 新增項目：", "green")));
            for item in &created {
                let record = &item.record;
                reply.push_str(&format!("• {} [{}]\n", record.title, record.category.label()));
                reply.push_str(&format!("  {}\n", record.summary));
                if !record.tags.is_empty() {
                    reply.push_str(&format!("  {}\n", self.colorize(&format_tags(&record.tags), "cyan")));
                }
            }
        }

        if !existing.is_empty() {
            reply.push_str(&format!("\n{}\n", self.colorize("🔄 已存在項目：", "yellow")));
            for item in &existing {
                reply.push_str(&format!("• {}\n", item.record.title));
            }
        }

        if !failed.is_empty() {
            reply.push_str(&format!("\n{}\n", self.colorize("❌ 處理失敗：", "red")));
            for item in &failed {
                if let SaveOutcome::Failed { reason } = &item.outcome {
                    reply.push_str(&format!("• {}（{}）\n", item.record.title, reason));
                }
            }
        }

        let events: Vec<(&CalendarEvent, Option<&String>)> = items
            .iter()
            .flat_map(|i| {
                i.record
                    .events
                    .iter()
                    .enumerate()
                    .map(move |(n, e)| (e, i.calendar_links.get(n).and_then(Option::as_ref)))
            })
            .collect();
        if !events.is_empty() {
            reply.push_str(&format!("\n{}\n", self.colorize("📅 行事曆：", "magenta")));
            for (event, link) in events {
                reply.push_str(&format!("• {}\n", format_event(event)));
                if let Some(link) = link {
                    reply.push_str(&format!("  {}\n", link));
                }
            }
        }

        reply.trim_end().to_string()
    }

    /// Format processing results as a table.
    fn format_items_table(&self, items: &[ProcessedItem]) -> String {
        if items.is_empty() {
            return self.colorize("No records.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Title", "Category", "Tags", "Status", "Events", "URL"]);

        for item in items {
            let record = &item.record;
            let status = match &item.outcome {
                SaveOutcome::Created { .. } => "created".to_string(),
                SaveOutcome::AlreadyExists => "exists".to_string(),
                SaveOutcome::Failed { reason } => format!("failed: {}", reason),
            };
            builder.push_record([
                record.title.clone(),
                record.category.as_str().to_string(),
                record.tags.join(", "),
                status,
                record.events.len().to_string(),
                record.url.clone().unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format detected links.
    pub fn format_urls(&self, urls: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(urls)?),
            _ if urls.is_empty() => Ok(self.info("No links found; the message would be processed as text.")),
            _ => Ok(urls.join("\n")),
        }
    }

    /// Format fetched page content.
    pub fn format_content(&self, content: &WebsiteContent) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(content)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["URL", content.url.as_str()]);
        builder.push_record(["Host", content.host.as_str()]);
        builder.push_record(["Title", content.title.as_str()]);
        builder.push_record(["Description", content.description.as_str()]);
        builder.push_record(["Keywords", content.keywords.as_str()]);
        builder.push_record(["Author", content.author.as_str()]);
        builder.push_record(["Headings".to_string(), content.headings.join(" | ")]);
        let excerpt: String = content.raw_content_excerpt.chars().take(200).collect();
        builder.push_record(["Excerpt".to_string(), excerpt]);

        let mut table = builder.build();
        table.with(Style::rounded());

        let mut out = table.to_string();
        if content.is_stub() {
            out.push('\n');
            out.push_str(&self.warning("Nothing could be extracted; this is the host-name stub."));
        }
        Ok(out)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Tags as hashtags.
pub fn format_tags(tags: &[String]) -> String {
    tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")
}

/// One-line event description: `[label] YYYY-MM-DD HH:MM title`.
pub fn format_event(event: &CalendarEvent) -> String {
    format!(
        "[{}] {} {}",
        event.event_type.label(),
        event.date_time.format("%Y-%m-%d %H:%M"),
        event.title
    )
}
