//! Login accounts (username + password hash).
//!
//! Accounts are who may sign in to the index page; they are unrelated to the
//! catalog's `User` records. Hashing and verification live in `tours-auth`;
//! this module only stores the encoded hash.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use tours_core::AccountId;

use crate::record_store::postgres::map_sqlx_error;
use crate::record_store::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub password_hash: String,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>>;
    /// Create the account, or replace the password hash if it already exists.
    async fn upsert(&self, username: &str, password_hash: &str) -> StoreResult<Account>;
}

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<BTreeMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values().find(|a| a.username == username).cloned())
    }

    async fn upsert(&self, username: &str, password_hash: &str) -> StoreResult<Account> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if let Some(existing) = map.values_mut().find(|a| a.username == username) {
            existing.password_hash = password_hash.to_string();
            return Ok(existing.clone());
        }
        let next = map.keys().next_back().map(|id| id.get()).unwrap_or(0) + 1;
        let account = Account {
            id: AccountId::new(next),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        map.insert(account.id, account.clone());
        Ok(account)
    }
}

/// Postgres-backed account store (table `accounts`).
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: AccountId::new(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query("SELECT id, username, password_hash FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_account", e))?;
        row.map(|r| account_from_row(&r).map_err(|e| map_sqlx_error("find_account", e)))
            .transpose()
    }

    #[instrument(skip(self, password_hash), err)]
    async fn upsert(&self, username: &str, password_hash: &str) -> StoreResult<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username)
            DO UPDATE SET password_hash = EXCLUDED.password_hash
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_account", e))?;
        account_from_row(&row).map_err(|e| map_sqlx_error("upsert_account", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_creates_then_replaces_hash() {
        let store = InMemoryAccountStore::new();
        let first = store.upsert("admin", "hash-1").await.unwrap();
        let second = store.upsert("admin", "hash-2").await.unwrap();
        let other = store.upsert("guia", "hash-3").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.password_hash, "hash-2");
        assert_ne!(other.id, first.id);

        let found = store.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "hash-2");
        assert_eq!(store.find_by_username("guia").await.unwrap().unwrap().id, other.id);
        assert!(store.find_by_username("nadie").await.unwrap().is_none());
    }
}
