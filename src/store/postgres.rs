//! PostgreSQL-backed user store
//!
//! Every operation is a single statement, so per-address atomicity comes from
//! the row lock Postgres takes for the write.

use async_trait::async_trait;
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{generate_nonce, NonceStore, StoreError};
use crate::auth::Address;
use crate::models::{Profile, RoleSet, UserRecord, DEFAULT_DISPLAY_NAME};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    address: String,
    username: String,
    name: String,
    bio: String,
    pfp: String,
    roles: Vec<String>,
    nonce: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let address = Address::parse(&row.address)
            .map_err(|e| StoreError::InvalidRecord(format!("{}: {}", row.address, e)))?;

        Ok(UserRecord {
            address,
            roles: RoleSet::from_stored(&row.roles),
            nonce: row.nonce,
            profile: Profile {
                username: row.username,
                name: row.name,
                bio: row.bio,
                pfp: row.pfp,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Store over the `users` table
#[derive(Clone)]
pub struct PgNonceStore {
    db_pool: PgPool,
}

impl PgNonceStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl NonceStore for PgNonceStore {
    async fn get_or_create(&self, address: &Address) -> Result<UserRecord, StoreError> {
        // ON CONFLICT waits on a concurrent insert of the same key, so the
        // select below always sees the single committed row.
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (address, username, name, bio, pfp, roles, nonce)
            VALUES ($1, $1, $2, '', '', $3, '')
            ON CONFLICT (address) DO NOTHING
            "#,
        )
        .bind(address.as_str())
        .bind(DEFAULT_DISPLAY_NAME)
        .bind(RoleSet::default().to_vec())
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if inserted == 1 {
            tracing::info!(address = %address, "Registered new account");
        }

        let row: UserRow = sqlx::query_as(
            r#"
            SELECT address, username, name, bio, pfp, roles, nonce, created_at, updated_at
            FROM users
            WHERE address = $1
            "#,
        )
        .bind(address.as_str())
        .fetch_one(&self.db_pool)
        .await?;

        row.try_into()
    }

    async fn rotate_nonce(&self, address: &Address) -> Result<String, StoreError> {
        let nonce = generate_nonce();

        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET nonce = $2, updated_at = NOW()
            WHERE address = $1
            "#,
        )
        .bind(address.as_str())
        .bind(&nonce)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(nonce)
    }

    async fn get_nonce(&self, address: &Address) -> Result<String, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT nonce FROM users WHERE address = $1")
            .bind(address.as_str())
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn get_roles(&self, address: &Address) -> Result<RoleSet, StoreError> {
        let roles = sqlx::query_scalar::<_, Vec<String>>("SELECT roles FROM users WHERE address = $1")
            .bind(address.as_str())
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(RoleSet::from_stored(&roles))
    }

    async fn consume_nonce(&self, address: &Address, expected: &str) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET nonce = '', updated_at = NOW()
            WHERE address = $1 AND nonce = $2 AND nonce <> ''
            "#,
        )
        .bind(address.as_str())
        .bind(expected)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::check_health(&self.db_pool).await?;
        Ok(())
    }
}
