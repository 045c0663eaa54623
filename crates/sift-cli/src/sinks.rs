//! In-process record and calendar sinks for local runs.

use crate::error::{CliError, Result};
use async_trait::async_trait;
use chrono::Utc;
use sift_domain::traits::{CalendarSink, RecordSink};
use sift_domain::{CalendarEvent, ExtractedRecord, SaveOutcome};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Base URL for calendar template links
pub const CALENDAR_TEMPLATE_URL: &str = "https://calendar.google.com/calendar/render";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    Stdout,
    File(PathBuf),
}

/// Writes one JSON object per record
///
/// Records whose URL was already written (earlier in the file, or earlier
/// in this session) come back as `AlreadyExists`.
#[derive(Debug)]
pub struct JsonLinesSink {
    destination: Destination,
    seen_urls: Mutex<HashSet<String>>,
}

impl JsonLinesSink {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self {
            destination: Destination::Stdout,
            seen_urls: Mutex::new(HashSet::new()),
        }
    }

    /// Sink appending to `path`, aware of URLs already in it
    pub async fn file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let seen = known_urls(&path).await?;
        debug!(path = %path.display(), known = seen.len(), "Opened record file");
        Ok(Self {
            destination: Destination::File(path),
            seen_urls: Mutex::new(seen),
        })
    }

    /// Whether records go to standard output
    pub fn is_stdout(&self) -> bool {
        self.destination == Destination::Stdout
    }

    async fn write(&self, lines: &str) -> Result<()> {
        match &self.destination {
            Destination::Stdout => {
                let mut out = tokio::io::stdout();
                out.write_all(lines.as_bytes()).await?;
                out.flush().await?;
            }
            Destination::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
                file.write_all(lines.as_bytes()).await?;
                file.flush().await?;
            }
        }
        Ok(())
    }

    fn location(&self) -> Option<String> {
        match &self.destination {
            Destination::Stdout => None,
            Destination::File(path) => Some(path.display().to_string()),
        }
    }
}

async fn known_urls(path: &Path) -> Result<HashSet<String>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e.into()),
    };

    let mut urls = HashSet::new();
    for (n, line) in contents.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => {
                if let Some(url) = value.get("url").and_then(|u| u.as_str()) {
                    urls.insert(url.to_string());
                }
            }
            Err(e) => warn!(line = n + 1, error = %e, "Skipping unreadable record line"),
        }
    }
    Ok(urls)
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    type Error = CliError;

    async fn save(&self, records: &[ExtractedRecord]) -> Result<Vec<SaveOutcome>> {
        let mut seen = self.seen_urls.lock().await;
        let mut lines = String::new();
        let mut outcomes = Vec::with_capacity(records.len());
        let mut written = Vec::new();

        for record in records {
            if let Some(url) = &record.url {
                if seen.contains(url) {
                    outcomes.push(SaveOutcome::AlreadyExists);
                    continue;
                }
            }
            match serde_json::to_string(record) {
                Ok(line) => {
                    lines.push_str(&line);
                    lines.push('\n');
                    if let Some(url) = &record.url {
                        seen.insert(url.clone());
                        written.push(url.clone());
                    }
                    outcomes.push(SaveOutcome::Created {
                        location: self.location(),
                    });
                }
                Err(e) => outcomes.push(SaveOutcome::Failed { reason: e.to_string() }),
            }
        }

        if !lines.is_empty() {
            if let Err(e) = self.write(&lines).await {
                for url in written {
                    seen.remove(&url);
                }
                return Err(e);
            }
        }
        Ok(outcomes)
    }
}

/// Renders events as calendar template links instead of calling a service
#[derive(Debug, Clone, Default)]
pub struct CalendarLinkSink;

impl CalendarLinkSink {
    /// Template link pre-filled with the event
    pub fn link(event: &CalendarEvent) -> Result<String> {
        let format = "%Y%m%dT%H%M%SZ";
        let dates = format!(
            "{}/{}",
            event.date_time.with_timezone(&Utc).format(format),
            event.end_time().with_timezone(&Utc).format(format)
        );
        let url = url::Url::parse_with_params(
            CALENDAR_TEMPLATE_URL,
            &[
                ("action", "TEMPLATE"),
                ("text", event.title.as_str()),
                ("dates", dates.as_str()),
                ("details", event.description.as_str()),
            ],
        )
        .map_err(|e| CliError::InvalidInput(format!("Cannot build calendar link: {}", e)))?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl CalendarSink for CalendarLinkSink {
    type Error = CliError;

    async fn add(&self, event: &CalendarEvent) -> Result<Option<String>> {
        Self::link(event).map(Some)
    }
}
