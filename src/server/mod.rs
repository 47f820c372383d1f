//! HTTP API server
//!
//! Routes, handlers and the shared state they run against. Storage calls
//! are synchronous and run on the blocking pool.

mod analytics;
mod error;
mod health;
mod notes;
mod router;
mod state;


use std::sync::Arc;

use notekeep_core::config::ServerConfig;
use notekeep_core::error::Result;
use notekeep_core::store::Store;

pub use router::build_router;
pub use state::ServerState;

/// Serve the API on the configured address until ctrl-c or SIGTERM
pub async fn run(store: Arc<dyn Store>, config: ServerConfig) -> Result<()> {
    let addr = config.bind_addr;
    let app = build_router(ServerState::new(store, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
