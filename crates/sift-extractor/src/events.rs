//! Temporal event extraction
//!
//! Two strategies share one output contract: every event handed out starts
//! strictly after the extraction instant.

use crate::config::{EventStrategy, ExtractorConfig};
use crate::dates::{find_dates, DateMatch};
use crate::error::ExtractorError;
use crate::heuristics::mentions;
use crate::parser::{self, RawEvent};
use crate::prompt::PromptBuilder;
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use sift_domain::traits::LlmProvider;
use sift_domain::{CalendarEvent, EventType, WebsiteContent};
use sift_llm::Orchestrator;
use std::sync::Arc;
use tracing::{debug, warn};

/// Keywords per event type, in priority order
const EVENT_KEYWORDS: &[(EventType, &[&str])] = &[
    (
        EventType::Deadline,
        &["截止", "期限", "到期", "最後一天", "截件", "deadline", "due"],
    ),
    (
        EventType::Registration,
        &["報名", "註冊", "登記", "register", "registration", "sign up", "signup"],
    ),
    (
        EventType::Meeting,
        &["會議", "開會", "座談", "研討會", "講座", "meeting", "meetup", "webinar", "seminar"],
    ),
    (
        EventType::Start,
        &["開始", "開幕", "開跑", "啟動", "開放", "start", "starts", "begin", "begins", "opens"],
    ),
    (
        EventType::End,
        &["結束", "閉幕", "截至", "end", "ends", "closes"],
    ),
    (
        EventType::Participation,
        &["參加", "參與", "出席", "attend", "join"],
    ),
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Time used when a date carries no explicit time
pub fn default_time(event_type: EventType) -> NaiveTime {
    let (hour, minute) = match event_type {
        EventType::Deadline => (23, 59),
        EventType::Registration | EventType::Start => (9, 0),
        EventType::Meeting => (14, 0),
        EventType::End => (18, 0),
        EventType::Participation | EventType::Reminder | EventType::Event => (10, 0),
    };
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Event type suggested by the words around a date
pub fn classify_window(window: &str) -> EventType {
    let lowered = window.to_lowercase();
    EVENT_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| mentions(&lowered, w)))
        .map(|(event_type, _)| *event_type)
        .unwrap_or(EventType::Event)
}

fn localize(offset: &FixedOffset, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    offset.from_local_datetime(&naive).single()
}

/// Resolve a model-supplied date/time string
///
/// Accepts RFC 3339, naive date-times and bare dates (interpreted in
/// `offset`), and finally anything the pattern scanner recognises.
pub fn parse_event_datetime(
    text: &str,
    offset: &FixedOffset,
    event_type: EventType,
    reference_year: i32,
) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return localize(offset, naive);
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return localize(offset, date.and_time(default_time(event_type)));
        }
    }

    let found = find_dates(text, reference_year).into_iter().next()?;
    let time = found.time.unwrap_or_else(|| default_time(event_type));
    localize(offset, found.date.and_time(time))
}

fn window_around(text: &str, found: &DateMatch, radius: usize) -> String {
    let before: Vec<char> = text[..found.start].chars().rev().take(radius).collect();
    let after: String = text[found.end..].chars().take(radius).collect();
    let before: String = before.into_iter().rev().collect();
    format!("{} {}", before.trim(), after.trim())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scan content for dates and type them by nearby keywords
pub fn pattern_events(
    content: &WebsiteContent,
    now: &DateTime<FixedOffset>,
    config: &ExtractorConfig,
) -> Vec<CalendarEvent> {
    let offset = config.utc_offset();
    let text = [
        content.title.as_str(),
        content.description.as_str(),
        content.raw_content_excerpt.as_str(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join("\n");

    let reference_year = now.with_timezone(&offset).year();
    let mut events = Vec::new();

    for found in find_dates(&text, reference_year) {
        let window = window_around(&text, &found, config.event_window_chars);
        let event_type = classify_window(&window);
        let time = found.time.unwrap_or_else(|| default_time(event_type));

        let Some(date_time) = localize(&offset, found.date.and_time(time)) else {
            continue;
        };

        let event = CalendarEvent {
            event_type,
            title: format!("{} - {}", event_type.label(), content.display_name()),
            date_time,
            description: collapse_whitespace(&window),
        };
        if event.is_after(now) {
            events.push(event);
        } else {
            debug!(date = %found.raw, "Skipping past date");
        }
    }

    events
}

/// Extracts calendar events with the configured strategy
pub struct EventExtractor<P> {
    orchestrator: Arc<Orchestrator<P>>,
    config: ExtractorConfig,
    prompts: PromptBuilder,
}

impl<P: LlmProvider> EventExtractor<P> {
    /// Create a new extractor
    pub fn new(orchestrator: Arc<Orchestrator<P>>, config: ExtractorConfig) -> Self {
        let prompts = PromptBuilder::new(
            config.prompt_excerpt_chars,
            config.summary_min_chars,
            config.summary_max_chars,
        );
        Self {
            orchestrator,
            config,
            prompts,
        }
    }

    /// Future events in `content`, relative to `now`
    ///
    /// Never fails; an exhausted model falls back to pattern scanning.
    pub async fn extract(&self, content: &WebsiteContent, now: &DateTime<FixedOffset>) -> Vec<CalendarEvent> {
        match self.config.event_strategy {
            EventStrategy::Pattern => pattern_events(content, now, &self.config),
            EventStrategy::Llm => match self.extract_with_llm(content, now).await {
                Ok(events) => events,
                Err(e) => {
                    warn!(item = %content.display_name(), error = %e, "Event extraction via model failed, scanning patterns");
                    pattern_events(content, now, &self.config)
                }
            },
        }
    }

    /// Model-driven extraction; errors are the caller's to absorb
    pub async fn extract_with_llm(
        &self,
        content: &WebsiteContent,
        now: &DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>, ExtractorError> {
        let prompt = self.prompts.events(content, now);
        let response = self.orchestrator.invoke(&prompt, parser::is_valid_event_list).await?;
        let raw = parser::parse_events(&response)?;
        debug!(candidates = raw.len(), "Parsed event candidates");

        Ok(raw
            .into_iter()
            .filter_map(|r| self.resolve(r, content, now))
            .collect())
    }

    fn resolve(&self, raw: RawEvent, content: &WebsiteContent, now: &DateTime<FixedOffset>) -> Option<CalendarEvent> {
        let offset = self.config.utc_offset();
        let event_type = EventType::coerce(&raw.event_type);
        let reference_year = now.with_timezone(&offset).year();

        let Some(date_time) = parse_event_datetime(&raw.datetime, &offset, event_type, reference_year) else {
            debug!(datetime = %raw.datetime, "Dropping event with unparseable date");
            return None;
        };

        let title = if raw.title.is_empty() {
            format!("{} - {}", event_type.label(), content.display_name())
        } else {
            raw.title
        };

        let event = CalendarEvent {
            event_type,
            title,
            date_time,
            description: raw.description,
        };
        event.is_after(now).then_some(event)
    }
}
