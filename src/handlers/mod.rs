//! API handlers

pub mod auth;
pub mod health;

pub use auth::*;
pub use health::{health_check, root};

// Re-export AuthenticatedUser from middleware for handler use
pub use crate::middleware::AuthenticatedUser;
