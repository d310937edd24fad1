//! Wallet authentication server
//!
//! Challenge-response login for Ethereum addresses: a client requests a
//! nonce, signs it with its wallet, and exchanges the signature for a
//! short-lived session token.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
