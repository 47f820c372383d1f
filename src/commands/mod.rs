//! CLI commands for notekeep

pub mod analytics;
pub mod dispatch;
pub mod serve;

use serde::Serialize;

use notekeep_core::error::Result;

/// Print a response envelope as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
