//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidafy Change Stream CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-changestream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scripted change stream scenario
    Replay {
        /// Scenario file (YAML)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Checkpoint file (JSON); read on start, updated after every event
        #[arg(short, long)]
        checkpoint: Option<PathBuf>,

        /// Stop after this many events
        #[arg(long)]
        max_events: Option<usize>,

        /// Stop after this many consecutive polls without an event
        #[arg(long, default_value = "1")]
        max_idle_polls: usize,
    },

    /// Classify a cursor failure as resumable or fatal
    Classify {
        /// Error code
        #[arg(long)]
        code: Option<i32>,

        /// Failure kind
        #[arg(long, default_value = "server")]
        kind: FailureKindArg,
    },

    /// Extract the resume token from a change document (JSON)
    Token {
        /// Read the document from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Failure kind argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FailureKindArg {
    /// Connection-level failure
    Connection,
    /// Server-reported failure
    Server,
    /// Local failure
    Local,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::parse_from([
            "solidafy-changestream",
            "replay",
            "--scenario",
            "orders.yaml",
            "--checkpoint",
            "state.json",
            "--max-events",
            "10",
        ]);

        match cli.command {
            Commands::Replay {
                scenario,
                checkpoint,
                max_events,
                max_idle_polls,
            } => {
                assert_eq!(scenario, PathBuf::from("orders.yaml"));
                assert_eq!(checkpoint, Some(PathBuf::from("state.json")));
                assert_eq!(max_events, Some(10));
                assert_eq!(max_idle_polls, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::parse_from([
            "solidafy-changestream",
            "-v",
            "classify",
            "--code",
            "237",
            "--kind",
            "connection",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Classify { code, kind } => {
                assert_eq!(code, Some(237));
                assert_eq!(kind, FailureKindArg::Connection);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
