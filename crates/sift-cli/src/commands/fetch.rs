//! Fetch command implementation.

use crate::cli::FetchArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use sift_fetch::{detect_urls, ContentAcquirer};

/// Execute the fetch command.
pub async fn execute_fetch(args: FetchArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let url = detect_urls(&args.url)
        .into_iter()
        .next()
        .ok_or_else(|| CliError::InvalidInput(format!("Not a link: {}", args.url)))?;

    config.fetch.validate().map_err(CliError::Config)?;
    let acquirer = ContentAcquirer::http(config.fetch.clone())
        .map_err(|e| CliError::Config(format!("Cannot build HTTP client: {}", e)))?;

    let content = acquirer.fetch_one(&url).await;
    println!("{}", formatter.format_content(&content)?);
    Ok(())
}
