//! Session token issuance and validation
//!
//! Tokens are HS256 JWTs carrying the wallet address and its roles.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::Address;
use crate::config::ConfigError;
use crate::models::RoleSet;

/// Default session lifetime: two hours
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 2 * 60 * 60;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Claims embedded in every session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Checksummed wallet address
    pub address: Address,
    /// Roles copied from the user record at issuance
    pub roles: RoleSet,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// A freshly signed token with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

impl IssuedToken {
    pub fn expires_in(&self) -> i64 {
        self.claims.exp - self.claims.iat
    }
}

/// Signs and validates session tokens with a server-held secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer; an empty secret or non-positive TTL is a startup error
    pub fn new(secret: &str, ttl_seconds: i64) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "JWT secret must not be empty".to_string(),
            ));
        }
        if ttl_seconds <= 0 {
            return Err(ConfigError::InvalidValue(format!(
                "Token TTL must be positive, got {}",
                ttl_seconds
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds),
        })
    }

    /// Issue a token for `address` carrying `roles`
    pub fn issue(&self, address: &Address, roles: &RoleSet) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let claims = SessionClaims {
            address: address.clone(),
            roles: roles.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }
}
