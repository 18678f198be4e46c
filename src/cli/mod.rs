//! CLI module
//!
//! Command-line interface for inspecting change stream behavior.
//!
//! # Commands
//!
//! - `replay` - Drive a change stream over a scripted scenario
//! - `classify` - Classify a cursor failure
//! - `token` - Extract the resume token from a change document

mod commands;
mod runner;

pub use commands::{Cli, Commands, FailureKindArg, OutputFormat};
pub use runner::Runner;
