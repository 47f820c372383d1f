use std::sync::Arc;

use notekeep_core::config::ServerConfig;
use notekeep_core::db::Database;
use notekeep_core::error::Result;

use crate::server;

/// Open the database and run the HTTP server until a shutdown signal
pub fn execute(config: ServerConfig) -> Result<()> {
    let db = Database::open(&config.database_path)?;
    tracing::info!(path = %config.database_path.display(), "using database");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server::run(Arc::new(db), config))
}
