//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::auth;
use crate::state::AppState;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/nonce", post(auth::request_nonce))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::current_session))
}

/// Query-string routes kept for clients of the first API version
pub fn legacy_routes() -> Router<AppState> {
    Router::new()
        .route("/getNonce", post(auth::legacy_get_nonce))
        .route("/login", post(auth::legacy_login))
}
