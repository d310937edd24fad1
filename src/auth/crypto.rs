//! Ethereum personal-message signature verification
//!
//! Recovers the signer of an EIP-191 `personal_sign` message with secp256k1
//! and compares it to the address the caller claims to own.

use keccak_hash::keccak;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, Secp256k1,
};
use thiserror::Error;

use super::address::Address;

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Errors that can occur while recovering a signer
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid signature encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid signature length: expected 64 or 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Unsupported recovery id: {0}")]
    UnsupportedRecoveryId(u8),

    #[error("Signer recovery failed: {0}")]
    RecoveryFailed(String),
}

/// Verify that `signature` over `message` was produced by `claimed`
///
/// Never fails loudly: any decoding or recovery problem is logged and
/// reported as `false`.
pub fn verify_personal_message(message: &str, signature: &str, claimed: &Address) -> bool {
    match recover_personal_signer(message, signature) {
        Ok(signer) if signer == *claimed => true,
        Ok(signer) => {
            tracing::warn!(
                claimed = %claimed,
                recovered = %signer,
                "Signature recovered to a different address"
            );
            false
        }
        Err(e) => {
            tracing::warn!(claimed = %claimed, error = %e, "Signature verification failed");
            false
        }
    }
}

/// Recover the address that signed `message` under EIP-191
pub fn recover_personal_signer(message: &str, signature: &str) -> Result<Address, CryptoError> {
    let bytes = decode_signature(signature)?;
    let (recovery_id, compact) = split_signature(&bytes)?;

    let signature = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    let digest = Message::from_digest(personal_message_hash(message));

    let public_key = Secp256k1::verification_only()
        .recover_ecdsa(&digest, &signature)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;

    Ok(address_from_public_key(&public_key))
}

/// keccak256("\x19Ethereum Signed Message:\n" + len + message)
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut payload = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    payload.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    payload.extend_from_slice(message.len().to_string().as_bytes());
    payload.extend_from_slice(message.as_bytes());
    keccak(&payload).0
}

/// Derive the address of a secp256k1 public key
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak(&uncompressed[1..]);

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.0[12..]);
    Address::from_bytes(&bytes)
}

fn decode_signature(signature: &str) -> Result<Vec<u8>, CryptoError> {
    let trimmed = signature.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(hex_part).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}

/// Split into recovery id and the 64-byte `r || s` form.
///
/// Accepts 65-byte `r || s || v` with `v` in {0, 1, 27, 28}, and 64-byte
/// EIP-2098 signatures where the parity lives in the top bit of `s`.
fn split_signature(bytes: &[u8]) -> Result<(RecoveryId, [u8; 64]), CryptoError> {
    let mut compact = [0u8; 64];

    let parity = match bytes.len() {
        65 => {
            compact.copy_from_slice(&bytes[..64]);
            match bytes[64] {
                0 | 27 => 0,
                1 | 28 => 1,
                v => return Err(CryptoError::UnsupportedRecoveryId(v)),
            }
        }
        64 => {
            compact.copy_from_slice(bytes);
            let parity = compact[32] >> 7;
            compact[32] &= 0x7f;
            parity
        }
        len => return Err(CryptoError::InvalidLength(len)),
    };

    let recovery_id = RecoveryId::from_i32(i32::from(parity))
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok((recovery_id, compact))
}
