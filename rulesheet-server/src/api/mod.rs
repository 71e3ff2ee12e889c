mod health;
mod sync;

use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// `handler_timeout` must exceed the engine's event budget, or a slow event
/// loses its report to a bare timeout response
pub fn router(state: Arc<AppState>, handler_timeout: Duration) -> Router {
    Router::new()
        .route("/api/sales-rules/sync", post(sync::sync_sales_rule))
        .route("/health", get(health::health))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            handler_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support;
