//! CLI module for Edgehop.
//!
//! This module provides the command-line interface. Running `edgehop` without
//! arguments starts the service; subcommands inspect zones, probe the scorer
//! and manage the configuration file.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::EdgeHopError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), EdgeHopError> {
    let cli = Cli::parse();
    cli.execute()
}

/// Runs the service with default options, as `edgehop run` would.
///
/// # Errors
///
/// Returns an error if the service cannot be started.
pub fn run_default() -> Result<(), EdgeHopError> { Cli::run_service().execute() }
