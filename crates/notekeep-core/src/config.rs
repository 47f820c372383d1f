//! Server configuration for notekeep
//!
//! Configuration is read from a TOML file (`--config` or `NOTEKEEP_CONFIG`).
//! Every key is optional; missing keys fall back to the defaults below.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NotekeepError, Result};

const DATA_DIR: &str = "notekeep";
const DATABASE_FILE: &str = "notekeep.db";
const CONFIG_ENV_VAR: &str = "NOTEKEEP_CONFIG";

/// Default aggregation window for summaries, in days
pub const DEFAULT_SUMMARY_DAYS: u32 = 30;
/// Default number of ranked tags returned
pub const DEFAULT_TAG_LIMIT: usize = 10;
/// Number of most recent events included in a summary
pub const DEFAULT_RECENT_EVENTS: usize = 10;

/// Configuration for the notekeep server and local commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    pub bind_addr: SocketAddr,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Summary window used when the request gives no `days`
    pub default_summary_days: u32,
    /// Tag ranking size used when the request gives no `limit`
    pub default_tag_limit: usize,
    /// Number of events listed under `recent_events`
    pub recent_events_limit: usize,
    /// Maximum accepted request body size
    pub max_request_body_bytes: usize,
    /// Maximum number of requests processed concurrently
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_path: default_database_path(),
            default_summary_days: DEFAULT_SUMMARY_DAYS,
            default_tag_limit: DEFAULT_TAG_LIMIT,
            recent_events_limit: DEFAULT_RECENT_EVENTS,
            max_request_body_bytes: 1024 * 1024,
            max_concurrent_requests: 256,
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join(DATA_DIR)
        .join(DATABASE_FILE)
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            NotekeepError::Other(format!(
                "failed to read config from {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: ServerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration from an explicit path, then `NOTEKEEP_CONFIG`,
    /// then built-in defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| NotekeepError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the aggregation layer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.default_summary_days == 0 {
            return Err(NotekeepError::validation(
                "default_summary_days",
                "must be at least 1",
            ));
        }
        if self.default_tag_limit == 0 {
            return Err(NotekeepError::validation(
                "default_tag_limit",
                "must be at least 1",
            ));
        }
        if self.recent_events_limit == 0 {
            return Err(NotekeepError::validation(
                "recent_events_limit",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Sets the database file.
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Sets the default summary window.
    pub fn with_default_summary_days(mut self, days: u32) -> Self {
        self.default_summary_days = days;
        self
    }

    /// Sets the default tag ranking size.
    pub fn with_default_tag_limit(mut self, limit: usize) -> Self {
        self.default_tag_limit = limit;
        self
    }
}
