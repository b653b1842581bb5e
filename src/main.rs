//! Plegar CLI
//!
//! Cross-validation training entry point for the plegar library.
//!
//! # Usage
//!
//! ```bash
//! # Draw balanced repeats and train with defaults
//! plegar train -d data -m baseline
//!
//! # Reuse pre-built repeats and report a vote ensemble
//! plegar train -d data -m baseline --cv-dir data/cv --keep vote
//!
//! # Build balanced repeat files without training
//! plegar prepare -d data -r 5 --seed 42
//!
//! # List the tables of a dataset store
//! plegar inspect data/train.safetensors
//! ```

use clap::Parser;
use plegar::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
