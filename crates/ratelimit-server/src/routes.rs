//! Route definitions and router configuration.

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use std::time::Duration;

use crate::handlers::{check_handler, health_handler, metrics_handler, override_handler, stats_handler};
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the full application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/check", get(check_handler))
        .route("/rate-limit-stats", get(stats_handler))
        .route("/users/:user_id/rate-limits", put(override_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::new(
            REQUEST_ID_HEADER.parse().expect("static header name parses"),
            MakeRequestUuid,
        ))
        .with_state(state)
}
