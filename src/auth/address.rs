//! Ethereum address parsing and EIP-55 checksums
//!
//! Addresses are accepted with or without the `0x` prefix. Single-case hex is
//! taken as-is; mixed-case input must carry a valid EIP-55 checksum.

use std::fmt;

use keccak_hash::keccak;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing an address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Expected 40 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("Address contains non-hex characters")]
    InvalidCharacter,

    #[error("Address checksum mismatch")]
    InvalidChecksum,
}

/// A validated Ethereum address, always held in checksummed `0x` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and canonicalise an address string
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let hex_part = input.strip_prefix("0x").unwrap_or(input);

        if hex_part.len() != 40 {
            return Err(AddressError::InvalidLength(hex_part.len()));
        }
        if !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidCharacter);
        }

        let checksummed = to_checksum(&hex_part.to_ascii_lowercase());

        let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && &checksummed[2..] != hex_part {
            return Err(AddressError::InvalidChecksum);
        }

        Ok(Self(checksummed))
    }

    /// Build an address from its raw 20 bytes
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        Self(to_checksum(&hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true if `input` is a well-formed address
pub fn is_valid_address(input: &str) -> bool {
    Address::parse(input).is_ok()
}

/// Apply EIP-55 mixed-case checksum to 40 lowercase hex characters
fn to_checksum(lower_hex: &str) -> String {
    let hash = keccak(lower_hex.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, ch) in lower_hex.chars().enumerate() {
        let byte = hash.0[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if ch.is_ascii_alphabetic() && nibble >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
