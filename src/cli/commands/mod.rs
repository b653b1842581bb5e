//! CLI command implementations

mod inspect;
mod prepare;
mod train;

use crate::cli::logging::LogLevel;
use crate::config::{Cli, Command};
use crate::error::Error;
use std::path::Path;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Prepare(args) => prepare::run_prepare(args, log_level),
        Command::Inspect(args) => inspect::run_inspect(args, log_level),
    }
}

/// Fatal [`Error::MissingPath`] unless `path` exists.
fn require_path(path: &Path) -> Result<(), Error> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::MissingPath(path.to_path_buf()))
    }
}
