//! Notekeep - note-taking backend with usage analytics
//!
//! Serves the notes and analytics REST API, and exposes the same
//! analytics operations as local commands against a SQLite database.

mod cli;
mod commands;
mod server;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use cli::Cli;
use notekeep_core::error::{ErrorStatus, NotekeepError};
use notekeep_core::logging;

fn main() -> ExitCode {
    let start = Instant::now();
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::debug!(elapsed = ?start.elapsed(), "parse_args");

    match commands::dispatch::run(&cli, start) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.to_json());
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(err: &NotekeepError) -> u8 {
    match err.status() {
        ErrorStatus::Server => 1,
        ErrorStatus::Client => 2,
        ErrorStatus::NotFound => 3,
    }
}
