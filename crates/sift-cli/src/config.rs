//! Configuration management for the CLI.
//!
//! One TOML file (`~/.sift/config.toml` by default) carries the CLI
//! settings plus a section per library crate. API keys come from the
//! environment and are never written back to disk.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sift_extractor::ExtractorConfig;
use sift_fetch::FetchConfig;
use sift_llm::LlmConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Provider matrix and orchestrator
    #[serde(default)]
    pub llm: LlmConfig,

    /// Page fetching
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Analysis and event extraction
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// REPL history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// JSON-lines file records are appended to; stdout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_path: Option<PathBuf>,

    /// Hand events to the calendar sink
    #[serde(default = "default_true")]
    pub calendar: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Chat-style reply
    Reply,
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Directory holding the config file and REPL history.
    pub fn dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".sift"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Load from `custom` if given, else from the default path. A missing
    /// file yields defaults. Environment overrides are applied last.
    pub fn load(custom: Option<&Path>) -> Result<Self> {
        let path = match custom {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };
        let config = Self::load_from(&path)?;
        Ok(config.with_env_overrides())
    }

    /// Load configuration from a specific file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Render as TOML (API keys are never included).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Overlay credentials and model names from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        self.llm = self.llm.with_env_overrides();
        self
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.fetch.validate().map_err(CliError::Config)?;
        self.extractor.validate().map_err(CliError::Config)?;
        self.llm.validate()?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Reply,
            history_size: 1000,
            records_path: None,
            calendar: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Reply
}

fn default_history_size() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_extractor::EventStrategy;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Reply);
        assert!(config.settings.records_path.is_none());
        assert_eq!(config.extractor.batch_size, 6);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.fetch.timeout_secs, 10);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[settings]\nformat = \"json\"\n\n[extractor]\nevent_strategy = \"pattern\"\nbatch_size = 3\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
        assert_eq!(config.extractor.event_strategy, EventStrategy::Pattern);
        assert_eq!(config.extractor.batch_size, 3);
        assert_eq!(config.extractor.summary_max_chars, 150);
        assert_eq!(config.llm.request_timeout_secs, 15);
    }

    #[test]
    fn test_save_roundtrip_omits_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.llm.api_keys = vec!["secret-key".into()];
        config.settings.records_path = Some(dir.path().join("records.jsonl"));
        config.save_to(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret-key"));

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.llm.api_keys.is_empty());
        assert_eq!(loaded.settings.records_path, config.settings.records_path);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[settings\ncolor = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_validate_requires_keys() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(CliError::Llm(_))));

        let mut config = Config::default();
        config.llm.api_keys = vec!["k".into()];
        assert!(config.validate().is_ok());
    }
}
