//! Interactive REPL (Read-Eval-Print Loop) mode.
//!
//! Every line is a message, as if it had been sent in a chat. Lines starting
//! with `/` are commands.

use crate::cli::{DetectArgs, FetchArgs};
use crate::commands::{self, Runner};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the interactive REPL.
pub async fn run_repl(config: &Config, formatter: &Formatter) -> Result<()> {
    let runner = Runner::from_config(
        config,
        config.settings.records_path.clone(),
        config.settings.calendar,
    )
    .await?;

    println!("{}", formatter.info("Sift REPL - send a message or link, '/help' for commands, '/exit' to quit"));
    println!();

    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e))))?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        match editor.readline("sift> ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_line(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => print_help(formatter),
                    Ok(ReplCommand::Detect(text)) => {
                        let args = DetectArgs { message: vec![text] };
                        if let Err(e) = commands::execute_detect(args, formatter) {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Ok(ReplCommand::Fetch(url)) => {
                        if let Err(e) = commands::execute_fetch(FetchArgs { url }, config, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Ok(ReplCommand::Message(message)) => match runner.handle(&message).await {
                        Ok(items) => println!("{}", formatter.format_items(&items)?),
                        Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                    },
                    Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use '/exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// One REPL input line, classified.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Exit,
    Help,
    Detect(String),
    Fetch(String),
    Message(String),
}

/// Classify a REPL input line.
fn parse_repl_line(line: &str) -> Result<ReplCommand> {
    let Some(command) = line.strip_prefix('/') else {
        return Ok(ReplCommand::Message(line.to_string()));
    };

    let (name, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
    let rest = rest.trim();

    match name {
        "exit" | "quit" | "q" => Ok(ReplCommand::Exit),
        "help" | "?" => Ok(ReplCommand::Help),
        "detect" if !rest.is_empty() => Ok(ReplCommand::Detect(rest.to_string())),
        "detect" => Err(CliError::InvalidInput("Usage: /detect <text>".to_string())),
        "fetch" if !rest.is_empty() => Ok(ReplCommand::Fetch(rest.to_string())),
        "fetch" => Err(CliError::InvalidInput("Usage: /fetch <url>".to_string())),
        _ => Err(CliError::InvalidInput(format!(
            "Unknown command: /{}. Type '/help' for available commands.",
            name
        ))),
    }
}

fn get_history_path() -> Result<PathBuf> {
    let dir = Config::dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Anything not starting with '/' is processed as a message."));
    println!();
    println!("  /detect <text>   - Show the links a message contains");
    println!("  /fetch <url>     - Fetch one page and show what was extracted");
    println!("  /help, /?        - Show this help");
    println!("  /exit, /quit, /q - Exit REPL");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_are_messages() {
        assert_eq!(
            parse_repl_line("看看 figma.com").unwrap(),
            ReplCommand::Message("看看 figma.com".into())
        );
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse_repl_line("/q").unwrap(), ReplCommand::Exit);
        assert_eq!(parse_repl_line("/?").unwrap(), ReplCommand::Help);
        assert_eq!(
            parse_repl_line("/fetch  example.com ").unwrap(),
            ReplCommand::Fetch("example.com".into())
        );
        assert_eq!(
            parse_repl_line("/detect a.io b.io").unwrap(),
            ReplCommand::Detect("a.io b.io".into())
        );
    }

    #[test]
    fn test_bad_commands() {
        assert!(parse_repl_line("/fetch").is_err());
        assert!(parse_repl_line("/unknown").is_err());
    }
}
