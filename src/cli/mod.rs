//! Command-line interface for the workflow dataset analyzer.
//!
//! Provides the `analyze` and `dedupe` commands.

mod commands;

pub use commands::{confirm, parse_cli, run, run_with_cli, Cli, Commands, WritePolicy};
