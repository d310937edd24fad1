//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use nonce_auth_server::auth::{
    address_from_public_key, personal_message_hash, Address, AuthService, TokenIssuer,
};
use nonce_auth_server::models::{RoleSet, UserRecord};
use nonce_auth_server::store::{MemoryNonceStore, NonceStore, StoreError};

pub const TEST_SECRET: &str = "integration-test-secret";

/// A deterministic wallet that signs like `personal_sign`
pub struct TestWallet {
    secret: SecretKey,
    pub address: Address,
}

impl TestWallet {
    pub fn from_seed(seed: u8) -> Self {
        let mut bytes = [0x11u8; 32];
        bytes[31] = seed;
        let secret = SecretKey::from_slice(&bytes).unwrap();
        let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret);
        Self {
            secret,
            address: address_from_public_key(&public),
        }
    }

    /// 65-byte `r || s || v` hex signature with `v` in {27, 28}
    pub fn sign(&self, message: &str) -> String {
        let digest = Message::from_digest(personal_message_hash(message));
        let (recovery_id, compact) = Secp256k1::new()
            .sign_ecdsa_recoverable(&digest, &self.secret)
            .serialize_compact();

        let mut bytes = compact.to_vec();
        bytes.push(27 + recovery_id.to_i32() as u8);
        format!("0x{}", hex::encode(bytes))
    }

    /// The address as a client would likely send it
    pub fn lowercase_address(&self) -> String {
        self.address.as_str().to_ascii_lowercase()
    }
}

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(TEST_SECRET, 2 * 60 * 60).unwrap()
}

pub fn service_with(store: Arc<dyn NonceStore>) -> AuthService {
    AuthService::new(store, token_issuer(), Duration::from_secs(2))
}

pub fn memory_service() -> (AuthService, MemoryNonceStore) {
    let store = MemoryNonceStore::new();
    (service_with(Arc::new(store.clone())), store)
}

/// Wraps a store and counts every call made to it
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: MemoryNonceStore,
    calls: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl NonceStore for CountingStore {
    async fn get_or_create(&self, address: &Address) -> Result<UserRecord, StoreError> {
        self.hit();
        self.inner.get_or_create(address).await
    }

    async fn rotate_nonce(&self, address: &Address) -> Result<String, StoreError> {
        self.hit();
        self.inner.rotate_nonce(address).await
    }

    async fn get_nonce(&self, address: &Address) -> Result<String, StoreError> {
        self.hit();
        self.inner.get_nonce(address).await
    }

    async fn get_roles(&self, address: &Address) -> Result<RoleSet, StoreError> {
        self.hit();
        self.inner.get_roles(address).await
    }

    async fn consume_nonce(&self, address: &Address, expected: &str) -> Result<bool, StoreError> {
        self.hit();
        self.inner.consume_nonce(address, expected).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.hit();
        self.inner.ping().await
    }
}

/// Healthy except that role lookups fail
#[derive(Clone, Default)]
pub struct RolesUnavailableStore {
    pub inner: MemoryNonceStore,
}

#[async_trait]
impl NonceStore for RolesUnavailableStore {
    async fn get_or_create(&self, address: &Address) -> Result<UserRecord, StoreError> {
        self.inner.get_or_create(address).await
    }

    async fn rotate_nonce(&self, address: &Address) -> Result<String, StoreError> {
        self.inner.rotate_nonce(address).await
    }

    async fn get_nonce(&self, address: &Address) -> Result<String, StoreError> {
        self.inner.get_nonce(address).await
    }

    async fn get_roles(&self, _: &Address) -> Result<RoleSet, StoreError> {
        Err(StoreError::Unavailable("roles query failed".to_string()))
    }

    async fn consume_nonce(&self, address: &Address, expected: &str) -> Result<bool, StoreError> {
        self.inner.consume_nonce(address, expected).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// A backend that is down
pub struct UnavailableStore;

#[async_trait]
impl NonceStore for UnavailableStore {
    async fn get_or_create(&self, _: &Address) -> Result<UserRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn rotate_nonce(&self, _: &Address) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get_nonce(&self, _: &Address) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get_roles(&self, _: &Address) -> Result<RoleSet, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn consume_nonce(&self, _: &Address, _: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// A backend that never answers in time
pub struct StalledStore;

impl StalledStore {
    async fn stall<T: Send>() -> Result<T, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(StoreError::Unavailable("stalled".to_string()))
    }
}

#[async_trait]
impl NonceStore for StalledStore {
    async fn get_or_create(&self, _: &Address) -> Result<UserRecord, StoreError> {
        Self::stall().await
    }

    async fn rotate_nonce(&self, _: &Address) -> Result<String, StoreError> {
        Self::stall().await
    }

    async fn get_nonce(&self, _: &Address) -> Result<String, StoreError> {
        Self::stall().await
    }

    async fn get_roles(&self, _: &Address) -> Result<RoleSet, StoreError> {
        Self::stall().await
    }

    async fn consume_nonce(&self, _: &Address, _: &str) -> Result<bool, StoreError> {
        Self::stall().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Self::stall().await
    }
}
