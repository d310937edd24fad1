//! Data models for the auth server

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::Address;

pub mod auth;
pub use auth::*;

/// Role assigned to every new account
pub const DEFAULT_ROLE: &str = "user";

/// Display name given to every new account
pub const DEFAULT_DISPLAY_NAME: &str = "Anonymous";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid role name: '{0}'")]
pub struct InvalidRole(pub String);

/// A named authorization grant
///
/// Role names are lowercase ASCII letters, digits, `_` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    pub fn parse(name: &str) -> Result<Self, InvalidRole> {
        let valid = !name.is_empty()
            && name.len() <= 64
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');

        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(InvalidRole(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Role {
    type Error = InvalidRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

/// Unordered set of roles, serialized as a sorted array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Build from stored role names, dropping any that fail validation
    pub fn from_stored<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roles = names
            .into_iter()
            .filter_map(|name| match Role::parse(name.as_ref()) {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring invalid stored role");
                    None
                }
            })
            .collect();
        Self(roles)
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|role| role.as_str() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().map(|role| role.as_str().to_string()).collect()
    }
}

/// New accounts start with the single `user` role
impl Default for RoleSet {
    fn default() -> Self {
        let mut roles = BTreeSet::new();
        roles.insert(Role(DEFAULT_ROLE.to_string()));
        Self(roles)
    }
}

/// Profile data carried alongside the auth state but never interpreted by it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub name: String,
    pub bio: String,
    pub pfp: String,
}

impl Profile {
    pub fn new_for(address: &Address) -> Self {
        Self {
            username: address.to_string(),
            name: DEFAULT_DISPLAY_NAME.to_string(),
            bio: String::new(),
            pfp: String::new(),
        }
    }
}

/// Persisted account, one per address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub address: Address,
    pub roles: RoleSet,
    /// Current challenge; empty when none is outstanding
    pub nonce: String,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// A fresh account with default roles and no outstanding challenge
    pub fn new(address: Address) -> Self {
        let now = Utc::now();
        Self {
            profile: Profile::new_for(&address),
            address,
            roles: RoleSet::default(),
            nonce: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_outstanding_nonce(&self) -> bool {
        !self.nonce.is_empty()
    }
}
