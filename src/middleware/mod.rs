//! Middleware for the auth API
//!
//! Request tracing, security headers, CORS, and the session-token extractor.

pub mod auth;
mod cors;
mod security;
mod tracing;

pub use auth::AuthenticatedUser;
pub use cors::cors_layer;
pub use security::{hsts_header, security_headers};
pub use tracing::{request_tracing, REQUEST_ID_HEADER};
