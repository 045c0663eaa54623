//! Sift CLI library.
//!
//! This library provides the core functionality for the Sift command-line interface,
//! including configuration management, command execution, the local sinks, and output
//! formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;
pub mod sinks;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
