//! Authentication module
//!
//! Provides wallet-based authentication using Ethereum addresses.
//! - Address validation with EIP-55 checksums
//! - Challenge-response authentication with single-use nonces
//! - Personal-message signature recovery
//! - JWT session tokens

mod address;
mod crypto;
mod jwt;
mod service;

pub use address::{is_valid_address, Address, AddressError};
pub use crypto::{
    address_from_public_key, personal_message_hash, recover_personal_signer,
    verify_personal_message, CryptoError,
};
pub use jwt::{IssuedToken, JwtError, SessionClaims, TokenIssuer, DEFAULT_TOKEN_TTL_SECONDS};
pub use service::{AuthError, AuthService, DEFAULT_STORE_TIMEOUT};
