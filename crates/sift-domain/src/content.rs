//! Content module - what the pipeline knows about one item

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept for a title derived from plain text
pub const TEXT_TITLE_CHARS: usize = 50;

/// Structured view of a fetched page (or of a plain-text message)
///
/// Produced by acquisition, consumed by the analyzer and the event
/// extractor, then dropped. Nothing here is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteContent {
    /// Source URL (empty for plain-text messages)
    pub url: String,

    /// Host name of the source URL, used for stub titles and fallbacks
    pub host: String,

    /// Best-effort page title
    pub title: String,

    /// Best-effort page description
    pub description: String,

    /// Meta keywords, if any
    pub keywords: String,

    /// Page author, if declared
    pub author: String,

    /// Body text, noise-stripped and truncated to a fixed budget
    pub raw_content_excerpt: String,

    /// Up to ten section headings
    pub headings: Vec<String>,

    /// Up to ten navigation labels
    pub nav_links: Vec<String>,
}

impl WebsiteContent {
    /// Minimal stand-in for a page that could not be fetched or parsed
    pub fn stub(url: impl Into<String>, host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            url: url.into(),
            title: host.clone(),
            host,
            ..Self::default()
        }
    }

    /// Treat a plain-text message as content
    ///
    /// The title is the first non-empty line, cut to [`TEXT_TITLE_CHARS`]
    /// characters with a trailing `...` when longer.
    pub fn from_text(body: &str) -> Self {
        let first_line = body
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();

        let title = if first_line.chars().count() > TEXT_TITLE_CHARS {
            let cut: String = first_line.chars().take(TEXT_TITLE_CHARS).collect();
            format!("{}...", cut)
        } else {
            first_line.to_string()
        };

        Self {
            title,
            raw_content_excerpt: body.trim().to_string(),
            ..Self::default()
        }
    }

    /// Whether this content came from a URL
    pub fn is_web(&self) -> bool {
        !self.url.is_empty()
    }

    /// Whether acquisition produced anything beyond the stub
    pub fn is_stub(&self) -> bool {
        self.description.is_empty()
            && self.raw_content_excerpt.is_empty()
            && self.headings.is_empty()
    }

    /// Name to show when nothing better is known
    pub fn display_name(&self) -> &str {
        if !self.title.trim().is_empty() {
            &self.title
        } else if !self.host.is_empty() {
            &self.host
        } else {
            &self.url
        }
    }

    /// All searchable text joined together, for keyword sniffing
    pub fn combined_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.keywords.as_str(),
            self.host.as_str(),
            self.raw_content_excerpt.as_str(),
        ];
        parts.extend(self.headings.iter().map(String::as_str));
        parts.retain(|p| !p.is_empty());
        parts.join("\n")
    }
}

/// One inbound extraction request
///
/// Created per message, consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionRequest {
    /// A message without links
    Text {
        /// The message text
        body: String,
    },

    /// A message with exactly one link
    Url {
        /// The link
        address: String,
    },

    /// A message with several links
    UrlBatch {
        /// The links, in the order they appeared
        addresses: Vec<String>,
    },
}

impl ExtractionRequest {
    /// Choose the request kind from the message and the links found in it
    pub fn from_message(body: &str, mut urls: Vec<String>) -> Self {
        match urls.len() {
            0 => ExtractionRequest::Text {
                body: body.to_string(),
            },
            1 => ExtractionRequest::Url {
                address: urls.remove(0),
            },
            _ => ExtractionRequest::UrlBatch { addresses: urls },
        }
    }

    /// Request kind as a short string (for logs)
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionRequest::Text { .. } => "text",
            ExtractionRequest::Url { .. } => "url",
            ExtractionRequest::UrlBatch { .. } => "url_batch",
        }
    }
}
