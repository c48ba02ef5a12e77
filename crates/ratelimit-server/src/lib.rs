//! # Rate Limiter Server
//!
//! HTTP server implementation using the Axum framework.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod response;
pub mod routes;
pub mod state;

pub use metrics::Metrics;
pub use routes::create_router;
pub use state::AppState;
