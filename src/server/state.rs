use std::sync::Arc;

use notekeep_core::analytics::{deliver, unconfirmed, AnalyticsEvent, IngestOutcome};
use notekeep_core::config::ServerConfig;
use notekeep_core::error::{NotekeepError, Result};
use notekeep_core::store::Store;

/// Application state type alias
pub type AppState = Arc<ServerState>;

/// Store handle and configuration shared by every handler
pub struct ServerState {
    store: Arc<dyn Store>,
    config: ServerConfig,
}

impl ServerState {
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> AppState {
        Arc::new(Self { store, config })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run a storage operation on the blocking pool
    pub async fn with_store<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&dyn Store) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| NotekeepError::Other(format!("storage task failed: {}", e)))?
    }

    /// Record an event; a failed or aborted write becomes an unconfirmed outcome
    pub async fn deliver(&self, event: AnalyticsEvent) -> IngestOutcome {
        let store = Arc::clone(&self.store);
        let pending = event.clone();
        match tokio::task::spawn_blocking(move || deliver(store.as_ref(), event)).await {
            Ok(outcome) => outcome,
            Err(e) => unconfirmed(pending, format!("storage task failed: {}", e)),
        }
    }
}
