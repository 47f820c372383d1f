//! Command dispatch logic for notekeep

use std::time::Instant;

use notekeep_core::config::ServerConfig;
use notekeep_core::db::Database;
use notekeep_core::error::Result;
use notekeep_core::trace_time;

use crate::cli::{Cli, Commands};
use crate::commands::{analytics, serve};

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let config = load_config(cli)?;
    trace_time!(start, "load_config");

    match &cli.command {
        Commands::Serve { bind } => {
            let config = match bind {
                Some(addr) => config.with_bind_addr(*addr),
                None => config,
            };
            serve::execute(config)
        }

        Commands::Track {
            event_type,
            user,
            session,
            data,
        } => {
            let db = open_database(&config, start)?;
            analytics::execute_track(
                &db,
                event_type,
                user.as_deref(),
                session.as_deref(),
                data.as_deref(),
            )
        }

        Commands::Summary { user, days } => {
            let db = open_database(&config, start)?;
            analytics::execute_summary(&db, &config, user.as_deref(), days.as_deref())
        }

        Commands::Tags { user, limit } => {
            let db = open_database(&config, start)?;
            analytics::execute_tags(&db, &config, user.as_deref(), limit.as_deref())
        }

        Commands::Stats { user } => {
            let db = open_database(&config, start)?;
            analytics::execute_stats(&db, user.as_deref())
        }
    }
}

fn load_config(cli: &Cli) -> Result<ServerConfig> {
    let config = ServerConfig::resolve(cli.config.as_deref())?;
    let config = match &cli.database {
        Some(path) => config.with_database_path(path.clone()),
        None => config,
    };
    config.validate()?;
    Ok(config)
}

fn open_database(config: &ServerConfig, start: Instant) -> Result<Database> {
    let db = Database::open(&config.database_path)?;
    trace_time!(start, "open_database");
    Ok(db)
}
