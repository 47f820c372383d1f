//! CLI argument parsing for notekeep
//!
//! Global flags: --verbose, --log-level, --log-json, --config, --database

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Notekeep - note-taking backend with usage analytics
#[derive(Parser, Debug)]
#[command(name = "notekeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path, overriding the configuration
    #[arg(long, global = true, env = "NOTEKEEP_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Record an analytics event
    Track {
        /// Event type, e.g. note_created
        event_type: String,

        /// Owner of the event
        #[arg(long)]
        user: Option<String>,

        /// Session identifier
        #[arg(long)]
        session: Option<String>,

        /// Event data as a JSON object
        #[arg(long)]
        data: Option<String>,
    },

    /// Summarize recent analytics events
    Summary {
        /// Restrict to one user
        #[arg(long)]
        user: Option<String>,

        /// Window size in days
        #[arg(long)]
        days: Option<String>,
    },

    /// Rank the most used note tags
    Tags {
        /// Restrict to one user
        #[arg(long)]
        user: Option<String>,

        /// Number of tags to return
        #[arg(long)]
        limit: Option<String>,
    },

    /// Show note usage statistics
    Stats {
        /// Restrict to one user
        #[arg(long)]
        user: Option<String>,
    },
}
