//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::{Path, PathBuf};

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    custom_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    let path = match custom_path {
        Some(path) => path.to_path_buf(),
        None => Config::path()?,
    };

    match args.action {
        ConfigAction::Show => show_config(config, formatter),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init { force } => init_config(path, force, formatter),
    }
}

/// Print the effective configuration.
fn show_config(config: &Config, formatter: &Formatter) -> Result<()> {
    println!("{}", config.to_toml()?);
    let keys = config.llm.api_keys.len();
    if keys == 0 {
        println!("{}", formatter.warning("No API keys configured (set GEMINI_API_KEYS or GEMINI_API_KEY)"));
    } else {
        println!("{}", formatter.info(&format!("{} API key(s) configured from the environment", keys)));
    }
    Ok(())
}

/// Write a default configuration file.
fn init_config(path: PathBuf, force: bool, formatter: &Formatter) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save_to(&path)?;
    println!("{}", formatter.success(&format!("Wrote {}", path.display())));
    Ok(())
}
