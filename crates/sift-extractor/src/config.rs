//! Configuration for the Extractor

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// How calendar events are pulled out of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStrategy {
    /// Ask the model; fall back to patterns when it is unavailable
    #[default]
    Llm,
    /// Scan for date patterns only, no model calls
    Pattern,
}

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Pages analyzed together in one model call
    pub batch_size: usize,

    /// Summaries shorter than this are regenerated
    pub summary_min_chars: usize,

    /// Summaries are cut to this length
    pub summary_max_chars: usize,

    /// Whether a weak summary gets one regeneration call
    pub summary_retry: bool,

    /// Upper bound on tags per record
    pub max_tags: usize,

    /// Fewer tags than this triggers backfill
    pub min_tags: usize,

    /// Backfill stops once this many tags are present
    pub tag_backfill_target: usize,

    /// Characters of page body included in prompts
    pub prompt_excerpt_chars: usize,

    /// Event extraction strategy
    pub event_strategy: EventStrategy,

    /// Characters inspected on each side of a date
    pub event_window_chars: usize,

    /// Offset used to interpret local dates and times
    pub utc_offset_hours: i32,
}

impl ExtractorConfig {
    /// Offset used for local dates; UTC if the configured value is out of range
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.summary_max_chars == 0 {
            return Err("summary_max_chars must be greater than 0".to_string());
        }
        if self.summary_min_chars > self.summary_max_chars {
            return Err("summary_min_chars cannot exceed summary_max_chars".to_string());
        }
        if self.min_tags > self.max_tags {
            return Err("min_tags cannot exceed max_tags".to_string());
        }
        if self.tag_backfill_target > self.max_tags {
            return Err("tag_backfill_target cannot exceed max_tags".to_string());
        }
        if self.event_window_chars == 0 {
            return Err("event_window_chars must be greater than 0".to_string());
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err("utc_offset_hours must be between -12 and 14".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            batch_size: 6,
            summary_min_chars: 60,
            summary_max_chars: 150,
            summary_retry: true,
            max_tags: 8,
            min_tags: 2,
            tag_backfill_target: 4,
            prompt_excerpt_chars: 1_200,
            event_strategy: EventStrategy::Llm,
            event_window_chars: 30,
            utc_offset_hours: 8,
        }
    }
}

impl ExtractorConfig {
    /// Fast preset: bigger batches, no summary retries, pattern-only events
    pub fn fast() -> Self {
        Self {
            batch_size: 8,
            summary_retry: false,
            prompt_excerpt_chars: 600,
            event_strategy: EventStrategy::Pattern,
            ..Self::default()
        }
    }

    /// Thorough preset: smaller batches, more page text per prompt
    pub fn thorough() -> Self {
        Self {
            batch_size: 5,
            prompt_excerpt_chars: 2_000,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.event_strategy, EventStrategy::Llm);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::fast().validate().is_ok());
        assert!(ExtractorConfig::thorough().validate().is_ok());
        assert_eq!(ExtractorConfig::fast().event_strategy, EventStrategy::Pattern);
    }

    #[test]
    fn test_invalid_batch_size() {
        let mut config = ExtractorConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_summary_bounds() {
        let config = ExtractorConfig::default();
        assert_eq!(config.summary_min_chars, 60);
        assert_eq!(config.summary_max_chars, 150);
    }

    #[test]
    fn test_invalid_summary_bounds() {
        let mut config = ExtractorConfig::default();
        config.summary_min_chars = config.summary_max_chars + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_offset() {
        assert_eq!(ExtractorConfig::default().utc_offset().local_minus_utc(), 8 * 3600);
        let mut config = ExtractorConfig::default();
        config.utc_offset_hours = 99;
        assert!(config.validate().is_err());
        assert_eq!(config.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("event_strategy = \"pattern\"\nbatch_size = 4\n").unwrap();
        assert_eq!(config.event_strategy, EventStrategy::Pattern);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.summary_max_chars, 150);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::thorough();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.batch_size, parsed.batch_size);
        assert_eq!(config.summary_min_chars, parsed.summary_min_chars);
        assert_eq!(config.event_strategy, parsed.event_strategy);
    }
}
