//! Router configuration

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use super::state::AppState;
use super::{analytics, health, notes};

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config().max_request_body_bytes;
    let max_concurrent = state.config().max_concurrent_requests;

    Router::new()
        .route("/health", get(health::health))
        // analytics
        .route("/api/analytics/track", post(analytics::track))
        .route("/api/analytics/summary", get(analytics::summary))
        .route("/api/analytics/tags", get(analytics::tags))
        .route("/api/analytics/stats", get(analytics::stats))
        // notes
        .route("/api/notes", post(notes::create).get(notes::list))
        .route(
            "/api/notes/{id}",
            get(notes::get).put(notes::update).delete(notes::remove),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
