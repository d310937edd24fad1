//! Request/response DTOs for the auth endpoints

use serde::{Deserialize, Serialize};

use crate::auth::Address;
use crate::models::RoleSet;

/// Request for a login challenge
#[derive(Debug, Deserialize)]
pub struct NonceRequest {
    pub address: String,
}

/// Response carrying the challenge to sign
#[derive(Debug, Serialize, Deserialize)]
pub struct NonceResponse {
    pub nonce: String,
}

/// Request to exchange a signed challenge for a token
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub address: String,
    #[serde(default)]
    pub nonce: String,
    /// Hex-encoded 65-byte (or EIP-2098 64-byte) signature
    #[serde(default)]
    pub signature: String,
}

/// Session token response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// Response shapes of the query-string endpoints kept for older clients. On
// failure the payload field is `null` and `msg` says why.

#[derive(Debug, Serialize, Deserialize)]
pub struct LegacyNonceResponse {
    pub nonce: Option<String>,
    pub msg: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LegacyLoginResponse {
    #[serde(rename = "JWT")]
    pub jwt: Option<String>,
    pub msg: String,
}

/// The authenticated caller, as seen by `/auth/me`
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub address: Address,
    pub roles: RoleSet,
    pub expires_at: i64,
}
