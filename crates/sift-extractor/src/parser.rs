//! Parse LLM output into analysis and event candidates
//!
//! The validators here are what the orchestrator uses to decide whether a
//! response counts; the parsers turn an accepted response into raw fields
//! for the repair stages.

use crate::error::ExtractorError;
use serde_json::Value;
use tracing::warn;

/// Fields of one analysis, before repair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAnalysis {
    /// Explicit position in a batch, when the model gave one
    pub index: Option<usize>,
    /// Title as returned
    pub title: String,
    /// Category as returned
    pub category: String,
    /// Tags as returned
    pub tags: Vec<String>,
    /// Summary as returned
    pub summary: String,
}

/// Fields of one event, before date parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    /// Event title
    pub title: String,
    /// Event type as returned
    pub event_type: String,
    /// Date/time text as returned
    pub datetime: String,
    /// Description
    pub description: String,
}

/// Extract JSON from response, handling markdown code blocks and chatter
/// around the payload
pub fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    // Markdown code block
    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        return Ok(lines[1..end].join("\n"));
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed.to_string());
    }

    // Prose around the payload: take the outermost bracketed span
    let start = trimmed
        .find(['{', '['])
        .ok_or_else(|| ExtractorError::InvalidFormat("No JSON found in response".to_string()))?;
    let close = if trimmed[start..].starts_with('{') { '}' } else { ']' };
    let end = trimmed
        .rfind(close)
        .filter(|&end| end > start)
        .ok_or_else(|| ExtractorError::InvalidFormat("Unterminated JSON in response".to_string()))?;
    Ok(trimmed[start..=end].to_string())
}

/// Parse a response into a JSON value
pub fn parse_value(response: &str) -> Result<Value, ExtractorError> {
    let json_str = extract_json(response)?;
    Ok(serde_json::from_str(&json_str)?)
}

fn has_title(value: &Value) -> bool {
    value
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty())
}

fn batch_items(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => obj.get("items").and_then(Value::as_array),
        _ => None,
    }
}

/// Validator for single analysis: a JSON object with a non-empty title
pub fn is_valid_analysis(response: &str) -> bool {
    parse_value(response).is_ok_and(|v| v.is_object() && has_title(&v))
}

/// Validator for batch analysis: an array (or `{items: [...]}`) with at
/// least one entry, every entry carrying a title
pub fn is_valid_batch(response: &str) -> bool {
    parse_value(response).is_ok_and(|v| {
        batch_items(&v).is_some_and(|items| !items.is_empty() && items.iter().all(has_title))
    })
}

/// Validator for event extraction: any JSON array
pub fn is_valid_event_list(response: &str) -> bool {
    parse_value(response).is_ok_and(|v| v.is_array())
}

/// Parse an accepted single-analysis response
pub fn parse_analysis(response: &str) -> Result<RawAnalysis, ExtractorError> {
    let value = parse_value(response)?;
    analysis_from_value(&value)
}

/// Parse an accepted batch response into entries, skipping malformed ones
pub fn parse_batch(response: &str) -> Result<Vec<RawAnalysis>, ExtractorError> {
    let value = parse_value(response)?;
    let items = batch_items(&value)
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON array".to_string()))?;

    let mut entries = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match analysis_from_value(item) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Failed to parse batch entry {}: {}", idx, e),
        }
    }
    Ok(entries)
}

/// Parse an accepted event response, skipping malformed entries
pub fn parse_events(response: &str) -> Result<Vec<RawEvent>, ExtractorError> {
    let value = parse_value(response)?;
    let items = value
        .as_array()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON array".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let datetime = ["iso_datetime", "date_time", "datetime", "date"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_str))?
                .trim()
                .to_string();
            Some(RawEvent {
                title: string_field(item, "title"),
                event_type: string_field(item, "type"),
                datetime,
                description: string_field(item, "description"),
            })
        })
        .collect())
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn analysis_from_value(value: &Value) -> Result<RawAnalysis, ExtractorError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Entry is not a JSON object".to_string()))?;

    let title = string_field(value, "title");
    if title.is_empty() {
        return Err(ExtractorError::InvalidFormat("Missing or empty 'title'".to_string()));
    }

    // Tags arrive as an array or, occasionally, a comma-separated string
    let tags = match obj.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split([',', '，', '、'])
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let index = obj
        .get("index")
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .map(|i| i as usize);

    Ok(RawAnalysis {
        index,
        title,
        category: string_field(value, "category"),
        tags,
        summary: string_field(value, "summary"),
    })
}
