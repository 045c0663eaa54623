//! Event module - calendar-worthy dates found in content

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of calendar event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Submission or application deadline
    Deadline,

    /// Registration opens or is due
    Registration,

    /// Something starts
    Start,

    /// Something ends
    End,

    /// A date the reader is expected to attend
    Participation,

    /// A meeting or talk
    Meeting,

    /// A reminder without a stronger meaning
    Reminder,

    /// Any other dated event
    Event,
}

impl EventType {
    /// All event types, in the order they are presented to the model
    pub const ALL: [EventType; 8] = [
        EventType::Deadline,
        EventType::Registration,
        EventType::Start,
        EventType::End,
        EventType::Participation,
        EventType::Meeting,
        EventType::Reminder,
        EventType::Event,
    ];

    /// Stable machine name (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Deadline => "deadline",
            EventType::Registration => "registration",
            EventType::Start => "start",
            EventType::End => "end",
            EventType::Participation => "participation",
            EventType::Meeting => "meeting",
            EventType::Reminder => "reminder",
            EventType::Event => "event",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Deadline => "截止",
            EventType::Registration => "報名",
            EventType::Start => "開始",
            EventType::End => "結束",
            EventType::Participation => "參加",
            EventType::Meeting => "會議",
            EventType::Reminder => "提醒",
            EventType::Event => "活動",
        }
    }

    /// Parse from a machine name or label; unknown values become `Event`
    pub fn coerce(s: &str) -> Self {
        let trimmed = s.trim();
        let lowered = trimmed.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered || t.label() == trimmed)
            .unwrap_or(EventType::Event)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A dated event derived from content
///
/// Values of this type handed out by the extractors are always strictly in
/// the future relative to the moment of extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Kind of event
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Event title
    pub title: String,

    /// Absolute start instant
    pub date_time: DateTime<FixedOffset>,

    /// Free-text description
    pub description: String,
}

impl CalendarEvent {
    /// Default length of a calendar entry
    pub const DEFAULT_DURATION_MINUTES: i64 = 60;

    /// End instant used by calendar collaborators (start + one hour)
    pub fn end_time(&self) -> DateTime<FixedOffset> {
        self.date_time + Duration::minutes(Self::DEFAULT_DURATION_MINUTES)
    }

    /// Whether the event starts strictly after `instant`
    pub fn is_after<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        self.date_time.timestamp() > instant.timestamp()
    }
}
