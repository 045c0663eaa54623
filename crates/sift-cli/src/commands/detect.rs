//! Detect command implementation.

use crate::cli::DetectArgs;
use crate::error::Result;
use crate::output::Formatter;
use sift_fetch::detect_urls;

/// Execute the detect command.
pub fn execute_detect(args: DetectArgs, formatter: &Formatter) -> Result<()> {
    let urls = detect_urls(&args.message.join(" "));
    println!("{}", formatter.format_urls(&urls)?);
    Ok(())
}
