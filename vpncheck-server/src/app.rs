//! Router construction

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the application router with all routes and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        // Lookup endpoint
        .route("/vpncheck", post(handlers::vpncheck))
        // Health checks
        .route("/health/live", get(handlers::health_live))
        .route("/health/ready", get(handlers::health_ready))
        // Metrics
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
