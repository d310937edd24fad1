//! In-process store for tests and local development

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{generate_nonce, NonceStore, StoreError};
use crate::auth::Address;
use crate::models::{RoleSet, UserRecord};

/// Map-backed store; each operation holds the lock for its whole duration
#[derive(Clone, Default)]
pub struct MemoryNonceStore {
    records: Arc<RwLock<HashMap<Address, UserRecord>>>,
}

impl MemoryNonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, address: &Address) -> Option<UserRecord> {
        self.records.read().await.get(address).cloned()
    }

    /// Overwrite an account's roles, as an administrator would
    pub async fn set_roles(&self, address: &Address, roles: RoleSet) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(address).ok_or(StoreError::NotFound)?;
        record.roles = roles;
        record.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl NonceStore for MemoryNonceStore {
    async fn get_or_create(&self, address: &Address) -> Result<UserRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(address.clone())
            .or_insert_with(|| {
                tracing::info!(address = %address, "Registered new account");
                UserRecord::new(address.clone())
            })
            .clone();
        Ok(record)
    }

    async fn rotate_nonce(&self, address: &Address) -> Result<String, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(address).ok_or(StoreError::NotFound)?;

        let nonce = generate_nonce();
        record.nonce = nonce.clone();
        record.updated_at = Utc::now();
        Ok(nonce)
    }

    async fn get_nonce(&self, address: &Address) -> Result<String, StoreError> {
        self.records
            .read()
            .await
            .get(address)
            .map(|record| record.nonce.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn get_roles(&self, address: &Address) -> Result<RoleSet, StoreError> {
        self.records
            .read()
            .await
            .get(address)
            .map(|record| record.roles.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn consume_nonce(&self, address: &Address, expected: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(address).ok_or(StoreError::NotFound)?;

        if expected.is_empty() || record.nonce != expected {
            return Ok(false);
        }
        record.nonce.clear();
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn address() -> Address {
        Address::parse("0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB").unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = MemoryNonceStore::new();

        let first = store.get_or_create(&address()).await.unwrap();
        store.rotate_nonce(&address()).await.unwrap();
        let second = store.get_or_create(&address()).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(first.created_at, second.created_at);
        // existing record comes back unchanged, nonce included
        assert!(second.has_outstanding_nonce());
    }

    #[tokio::test]
    async fn test_rotate_replaces_nonce() {
        let store = MemoryNonceStore::new();
        store.get_or_create(&address()).await.unwrap();

        let first = store.rotate_nonce(&address()).await.unwrap();
        let second = store.rotate_nonce(&address()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.get_nonce(&address()).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_missing_record() {
        let store = MemoryNonceStore::new();

        assert!(matches!(
            store.get_nonce(&address()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.get_roles(&address()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.rotate_nonce(&address()).await,
            Err(StoreError::NotFound)
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_consume_nonce_only_once() {
        let store = MemoryNonceStore::new();
        store.get_or_create(&address()).await.unwrap();
        let nonce = store.rotate_nonce(&address()).await.unwrap();

        assert!(!store.consume_nonce(&address(), "other").await.unwrap());
        assert!(store.consume_nonce(&address(), &nonce).await.unwrap());
        assert!(!store.consume_nonce(&address(), &nonce).await.unwrap());
        assert_eq!(store.get_nonce(&address()).await.unwrap(), "");
        assert!(!store.consume_nonce(&address(), "").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_roles() {
        let store = MemoryNonceStore::new();
        store.get_or_create(&address()).await.unwrap();

        let mut roles = RoleSet::default();
        roles.insert(Role::parse("admin").unwrap());
        store.set_roles(&address(), roles.clone()).await.unwrap();

        assert_eq!(store.get_roles(&address()).await.unwrap(), roles);
    }
}
