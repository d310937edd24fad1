//! Route definitions

use axum::{
    routing::{any, get},
    Router,
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

mod auth;

pub use auth::{auth_routes, legacy_routes};

/// Full application router with request tracing and security headers.
///
/// CORS and HSTS depend on deployment configuration and are layered on by the
/// caller.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(auth_routes())
        .merge(legacy_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}
