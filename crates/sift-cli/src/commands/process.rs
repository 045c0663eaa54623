//! Process command implementation.

use crate::cli::ProcessArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::{Formatter, ProcessedItem};
use crate::sinks::{CalendarLinkSink, JsonLinesSink};
use sift_domain::traits::{CalendarSink, LlmProvider, PageFetcher, RecordSink};
use sift_extractor::Pipeline;
use sift_fetch::{ContentAcquirer, HttpFetcher};
use sift_llm::{GeminiProvider, Orchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::warn;

/// Pipeline plus the sinks its records and events go to.
pub struct Runner<P, F> {
    pipeline: Pipeline<P, F>,
    sink: JsonLinesSink,
    calendar: Option<CalendarLinkSink>,
}

impl Runner<GeminiProvider, HttpFetcher> {
    /// Build the production runner from configuration.
    pub async fn from_config(config: &Config, out: Option<PathBuf>, calendar: bool) -> Result<Self> {
        config.validate()?;

        let timeout = config.llm.request_timeout();
        let provider = match &config.llm.endpoint {
            Some(endpoint) => GeminiProvider::with_endpoint(endpoint.clone(), timeout)?,
            None => GeminiProvider::new(timeout)?,
        };
        let orchestrator = Orchestrator::from_config(provider, &config.llm)?;
        let acquirer = ContentAcquirer::http(config.fetch.clone())
            .map_err(|e| CliError::Config(format!("Cannot build HTTP client: {}", e)))?;
        let pipeline = Pipeline::new(Arc::new(orchestrator), acquirer, config.extractor.clone())?;

        let sink = match out {
            Some(path) => JsonLinesSink::file(path).await?,
            None => JsonLinesSink::stdout(),
        };

        Ok(Self::new(pipeline, sink, calendar.then_some(CalendarLinkSink)))
    }
}

impl<P: LlmProvider, F: PageFetcher> Runner<P, F> {
    /// Assemble a runner from parts.
    pub fn new(pipeline: Pipeline<P, F>, sink: JsonLinesSink, calendar: Option<CalendarLinkSink>) -> Self {
        Self {
            pipeline,
            sink,
            calendar,
        }
    }

    /// Whether records are written to stdout.
    pub fn writes_to_stdout(&self) -> bool {
        self.sink.is_stdout()
    }

    /// Process one message, save its records, and add its events.
    pub async fn handle(&self, message: &str) -> Result<Vec<ProcessedItem>> {
        let records = self.pipeline.process(message).await;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = self.sink.save(&records).await?;

        let mut items = Vec::with_capacity(records.len());
        for (record, outcome) in records.into_iter().zip(outcomes) {
            let mut calendar_links = Vec::with_capacity(record.events.len());
            if let Some(calendar) = &self.calendar {
                for event in &record.events {
                    match calendar.add(event).await {
                        Ok(link) => calendar_links.push(link),
                        Err(e) => {
                            warn!(event = %event.title, error = %e, "Calendar sink failed");
                            calendar_links.push(None);
                        }
                    }
                }
            }
            items.push(ProcessedItem {
                record,
                outcome,
                calendar_links,
            });
        }
        Ok(items)
    }
}

/// Message text from the file, stdin, or positional words.
async fn read_message(args: &ProcessArgs) -> Result<String> {
    let message = if let Some(path) = &args.file {
        tokio::fs::read_to_string(path).await?
    } else if args.stdin {
        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await?;
        buffer
    } else {
        args.message.join(" ")
    };

    if message.trim().is_empty() {
        return Err(CliError::InvalidInput(
            "No message given (pass text, --file or --stdin)".to_string(),
        ));
    }
    Ok(message)
}

/// Execute the process command.
pub async fn execute_process(args: ProcessArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let message = read_message(&args).await?;

    let mut config = config.clone();
    if let Some(events) = args.events {
        config.extractor.event_strategy = events.into();
    }
    let out = args.out.or_else(|| config.settings.records_path.clone());
    let calendar = config.settings.calendar && !args.no_calendar;

    let runner = Runner::from_config(&config, out, calendar).await?;
    let items = runner.handle(&message).await?;

    // stdout JSON-lines already are the JSON output
    if !(runner.writes_to_stdout() && formatter.format() == OutputFormat::Json) {
        println!("{}", formatter.format_items(&items)?);
    }
    Ok(())
}
