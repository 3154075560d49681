//! Fixed-window rate limiting gate for API routes.
//!
//! Every inbound request passes through [`middleware::rate_limit_middleware`].
//! Requests whose path starts with the protected prefix are counted per
//! client in a [`rate_limit::RateLimiter`]; everything else passes untouched.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod rate_limit;
pub mod state;
pub mod sweeper;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{any, get},
};
use std::sync::Arc;

use crate::state::AppState;

/// Build the router with the gate layered over every route.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api", any(handlers::api_handler))
        .route("/api/{*path}", any(handlers::api_handler))
        .layer(from_fn_with_state(
            Arc::clone(&state),
            middleware::rate_limit_middleware,
        ))
        .with_state(state)
}
