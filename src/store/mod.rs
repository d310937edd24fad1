//! User record persistence
//!
//! The auth protocol only needs a handful of single-record operations, each of
//! which must be atomic per address. [`NonceStore`] captures them so the
//! protocol can run against Postgres in production and memory in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Address;
use crate::db::DbError;
use crate::models::{RoleSet, UserRecord};

mod memory;
mod postgres;

pub use memory::MemoryNonceStore;
pub use postgres::PgNonceStore;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User record not found")]
    NotFound,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Persistence operations used by the challenge-response flow
#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Return the record for `address`, creating it with default roles and
    /// no nonce if absent. At most one record is ever created per address.
    async fn get_or_create(&self, address: &Address) -> Result<UserRecord, StoreError>;

    /// Replace the record's nonce with a fresh random one and return it
    async fn rotate_nonce(&self, address: &Address) -> Result<String, StoreError>;

    /// Current nonce; empty if no challenge is outstanding
    async fn get_nonce(&self, address: &Address) -> Result<String, StoreError>;

    async fn get_roles(&self, address: &Address) -> Result<RoleSet, StoreError>;

    /// Clear the nonce only if it still equals `expected`.
    ///
    /// Returns false if it was already consumed or rotated.
    async fn consume_nonce(&self, address: &Address, expected: &str) -> Result<bool, StoreError>;

    /// Check backend connectivity
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Generate a new challenge: a random UUIDv4 (122 bits of entropy)
pub fn generate_nonce() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_nonce_is_uuid_v4() {
        let nonce = generate_nonce();
        let parsed = Uuid::parse_str(&nonce).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(nonce, generate_nonce());
    }

    #[test]
    fn test_db_errors_mean_unavailable() {
        let err = StoreError::from(DbError::HealthCheckError("connection reset".to_string()));
        assert!(matches!(err, StoreError::Unavailable(ref msg) if msg.contains("connection reset")));
    }
}
