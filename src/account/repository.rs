//! Account storage behind a narrow lookup/insert interface.
//!
//! Two implementations: an in-memory store (default, and the test double)
//! and a PostgreSQL store. The Postgres implementation uses runtime
//! queries to avoid sqlx compile-time database connection.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::atomic::{AtomicI64, Ordering};

use super::models::{Account, NewAccount};
use crate::db::RepoError;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn insert(&self, new: NewAccount) -> Result<Account, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, RepoError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, RepoError>;
    /// Identity-key lookup: the only query the authentication gate needs.
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Account>, RepoError>;
    async fn count(&self) -> Result<i64, RepoError>;
}

/// Thread-safe in-memory account store.
pub struct MemoryAccountRepository {
    accounts: DashMap<i64, Account>,
    next_id: AtomicI64,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn insert(&self, new: NewAccount) -> Result<Account, RepoError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let account = Account {
            id,
            username: new.username,
            password_hash: new.password_hash,
            nickname: new.nickname,
            is_admin: new.is_admin,
            api_key: new.api_key,
            created_at: now,
            modified_at: now,
        };
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, RepoError> {
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, RepoError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.username == username)
            .map(|a| a.value().clone()))
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Account>, RepoError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.api_key == api_key)
            .map(|a| a.value().clone()))
    }

    async fn count(&self) -> Result<i64, RepoError> {
        Ok(self.accounts.len() as i64)
    }
}

/// PostgreSQL account store.
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &PgRow) -> Result<Account, sqlx::Error> {
        Ok(Account {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            nickname: row.try_get("nickname")?,
            is_admin: row.try_get("is_admin")?,
            api_key: row.try_get("api_key")?,
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
        })
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<Account>, RepoError> {
        let query = format!(
            "SELECT id, username, password_hash, nickname, is_admin, api_key, \
             created_at, modified_at FROM accounts WHERE {column} = $1"
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| Self::row_to_account(&r)).transpose().map_err(Into::into)
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn insert(&self, new: NewAccount) -> Result<Account, RepoError> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (username, password_hash, nickname, is_admin, api_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password_hash, nickname, is_admin, api_key,
                      created_at, modified_at
            "#,
        )
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.nickname)
        .bind(new.is_admin)
        .bind(&new.api_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::row_to_account(&row)?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, nickname, is_admin, api_key,
                   created_at, modified_at
            FROM accounts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| Self::row_to_account(&r)).transpose().map_err(Into::into)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, RepoError> {
        self.find_one("username", username).await
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Account>, RepoError> {
        self.find_one("api_key", api_key).await
    }

    async fn count(&self) -> Result<i64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(username: &str, api_key: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            nickname: username.to_string(),
            is_admin: false,
            api_key: api_key.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = MemoryAccountRepository::new();
        let a = repo.insert(new_account("user1", "key-1")).await.unwrap();
        let b = repo.insert(new_account("user2", "key-2")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_by_api_key() {
        let repo = MemoryAccountRepository::new();
        repo.insert(new_account("user1", "key-1")).await.unwrap();

        let found = repo.find_by_api_key("key-1").await.unwrap().unwrap();
        assert_eq!(found.username, "user1");
        assert!(repo.find_by_api_key("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let repo = MemoryAccountRepository::new();
        repo.insert(new_account("user1", "key-1")).await.unwrap();

        assert!(repo.find_by_username("user1").await.unwrap().is_some());
        assert!(repo.find_by_username("user9").await.unwrap().is_none());
    }
}
