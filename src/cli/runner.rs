//! CLI runner - executes commands

use crate::classify::classify;
use crate::cli::commands::{Cli, Commands, FailureKindArg, OutputFormat};
use crate::config::load_replay_config;
use crate::error::{CursorFailure, Error, Result, ResultExt};
use crate::replay::{replay, ReplayOptions};
use crate::state::CheckpointStore;
use crate::token::resume_token_of;
use serde_json::{json, Value};
use std::fs;
use std::io::Read;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Replay {
                scenario,
                checkpoint,
                max_events,
                max_idle_polls,
            } => self.replay(
                scenario,
                checkpoint.as_deref(),
                ReplayOptions {
                    max_events: *max_events,
                    max_idle_polls: *max_idle_polls,
                },
            ),
            Commands::Classify { code, kind } => self.classify(*code, *kind),
            Commands::Token { file } => self.token(file.as_deref()),
        }
    }

    /// Replay a scenario, printing one message per event
    fn replay(
        &self,
        scenario: &Path,
        checkpoint: Option<&Path>,
        options: ReplayOptions,
    ) -> Result<()> {
        let config = load_replay_config(scenario)?;
        let mut store = match checkpoint {
            Some(path) => CheckpointStore::from_file(path)
                .with_context(|| format!("Failed to open checkpoint '{}'", path.display()))?,
            None => CheckpointStore::in_memory(),
        };

        let summary = replay(&config, &mut store, options, |event| {
            self.output_message(&json!({
                "type": "EVENT",
                "key": event.key,
                "document": event.to_json(),
            }));
            Ok(())
        })?;

        self.output_message(&json!({
            "type": "SUMMARY",
            "stream": summary.stream,
            "events": summary.stats.events,
            "resumes": summary.stats.resumes,
            "exhausted": summary.exhausted,
            "resume_token": summary.resume_token.map(|t| t.to_json()),
        }));
        Ok(())
    }

    /// Classify a failure described on the command line
    fn classify(&self, code: Option<i32>, kind: FailureKindArg) -> Result<()> {
        let failure = match (kind, code) {
            (FailureKindArg::Connection, None) => CursorFailure::connection("connection failure"),
            (FailureKindArg::Connection, Some(code)) => {
                CursorFailure::connection_with_code(code, "connection failure")
            }
            (FailureKindArg::Server, Some(code)) => CursorFailure::server(code, "server error"),
            (FailureKindArg::Server, None) => {
                return Err(Error::invalid_input("--code is required for server failures"))
            }
            (FailureKindArg::Local, _) => CursorFailure::local("local error"),
        };

        self.output_message(&json!({
            "type": "CLASSIFICATION",
            "kind": format!("{kind:?}").to_lowercase(),
            "code": failure.code(),
            "classification": classify(&failure).to_string(),
        }));
        Ok(())
    }

    /// Extract a resume token from a JSON change document
    fn token(&self, file: Option<&Path>) -> Result<()> {
        let content = match file {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read change document '{}'", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read change document from stdin")?;
                buf
            }
        };

        let document: Value =
            serde_json::from_str(&content).context("Change document is not valid JSON")?;
        let token = resume_token_of(&document)?;
        self.output_message(&json!({
            "type": "RESUME_TOKEN",
            "resume_token": token.to_json(),
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
