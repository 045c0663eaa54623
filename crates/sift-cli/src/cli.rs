//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sift - turn chat messages and links into categorized, summarized records.
#[derive(Debug, Parser)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Chat-style reply (default)
    Reply,
    /// Table format
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process one message: detect links, fetch, analyze, extract events
    Process(ProcessArgs),

    /// List the links a message would be processed as
    Detect(DetectArgs),

    /// Fetch one page and show what was extracted from it
    Fetch(FetchArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),

    /// Enter interactive mode, one message per line
    Repl,
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Message text (words are joined with spaces)
    pub message: Vec<String>,

    /// Read the message from a file
    #[arg(long, conflicts_with = "stdin")]
    pub file: Option<PathBuf>,

    /// Read the message from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Append records to this JSON-lines file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Event extraction strategy
    #[arg(short, long, value_enum)]
    pub events: Option<EventsArg>,

    /// Do not hand events to the calendar sink
    #[arg(long)]
    pub no_calendar: bool,
}

/// Arguments for the detect command.
#[derive(Debug, Parser)]
pub struct DetectArgs {
    /// Message text (words are joined with spaces)
    #[arg(required = true)]
    pub message: Vec<String>,
}

/// Arguments for the fetch command.
#[derive(Debug, Parser)]
pub struct FetchArgs {
    /// Link to fetch (bare domains are accepted)
    pub url: String,
}

/// Arguments for config management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (API keys redacted)
    Show,

    /// Print the configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Event strategy argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventsArg {
    /// Ask the model, fall back to date patterns
    Llm,
    /// Date patterns only
    Pattern,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Reply => crate::config::OutputFormat::Reply,
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<EventsArg> for sift_extractor::EventStrategy {
    fn from(arg: EventsArg) -> Self {
        match arg {
            EventsArg::Llm => sift_extractor::EventStrategy::Llm,
            EventsArg::Pattern => sift_extractor::EventStrategy::Pattern,
        }
    }
}
