//! Authentication service
//!
//! The two-phase challenge-response flow:
//!
//! 1. [`AuthService::request_challenge`] registers the address on first use
//!    and hands out a fresh nonce, invalidating any earlier one.
//! 2. [`AuthService::complete_login`] checks the signed nonce against the
//!    stored one, signs a session token and consumes the nonce. Consumption
//!    is the last step, so the stored nonce only changes on success.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::address::Address;
use super::crypto::verify_personal_message;
use super::jwt::{IssuedToken, JwtError, SessionClaims, TokenIssuer};
use crate::store::{NonceStore, StoreError};

/// Default bound on a single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid wallet address")]
    InvalidAddress,

    #[error("Invalid nonce")]
    InvalidNonce,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Token error: {0}")]
    Token(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::Storage(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::Token(e.to_string())
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn NonceStore>,
    tokens: TokenIssuer,
    store_timeout: Duration,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(store: Arc<dyn NonceStore>, tokens: TokenIssuer, store_timeout: Duration) -> Self {
        Self {
            store,
            tokens,
            store_timeout,
        }
    }

    /// Issue a fresh nonce for `address`, registering it if unseen
    pub async fn request_challenge(&self, address: &str) -> Result<String, AuthError> {
        let address = Address::parse(address).map_err(|e| {
            tracing::debug!(error = %e, "Rejected challenge request");
            AuthError::InvalidAddress
        })?;

        self.bounded(self.store.get_or_create(&address)).await?;
        let nonce = self.bounded(self.store.rotate_nonce(&address)).await?;

        tracing::debug!(address = %address, "Issued login challenge");
        Ok(nonce)
    }

    /// Exchange a signed nonce for a session token
    pub async fn complete_login(
        &self,
        address: &str,
        nonce: &str,
        signature: &str,
    ) -> Result<IssuedToken, AuthError> {
        let address = Address::parse(address).map_err(|e| {
            tracing::debug!(error = %e, "Rejected login request");
            AuthError::InvalidAddress
        })?;

        let stored = match self.bounded(self.store.get_nonce(&address)).await {
            Ok(stored) => stored,
            Err(StoreError::NotFound) => return Err(AuthError::InvalidNonce),
            Err(e) => return Err(e.into()),
        };

        if stored.is_empty() || nonce.is_empty() || nonce != stored {
            return Err(AuthError::InvalidNonce);
        }

        if !verify_personal_message(nonce, signature, &address) {
            tracing::warn!(address = %address, "Login attempt with invalid signature");
            return Err(AuthError::InvalidSignature);
        }

        // Everything that can fail runs before the nonce is consumed, so a
        // failed login leaves the challenge redeemable.
        let roles = self.bounded(self.store.get_roles(&address)).await?;
        let issued = self.tokens.issue(&address, &roles)?;

        // A concurrent login or a new challenge may have replaced the nonce
        // since it was read.
        if !self
            .bounded(self.store.consume_nonce(&address, nonce))
            .await?
        {
            return Err(AuthError::InvalidNonce);
        }

        tracing::info!(address = %address, roles = ?roles.to_vec(), "Login succeeded");
        Ok(issued)
    }

    /// Validate a session token issued by this service
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.tokens.verify(token)
    }

    /// Check the store is reachable
    pub async fn check_store(&self) -> Result<(), AuthError> {
        self.bounded(self.store.ping()).await?;
        Ok(())
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.store_timeout, operation).await {
            Ok(result) => result.map_err(|e| {
                if !matches!(e, StoreError::NotFound) {
                    tracing::error!(error = %e, "Store operation failed");
                }
                e
            }),
            Err(_) => {
                tracing::error!(timeout = ?self.store_timeout, "Store operation timed out");
                Err(StoreError::Unavailable(format!(
                    "timed out after {:?}",
                    self.store_timeout
                )))
            }
        }
    }
}
