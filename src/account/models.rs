//! Account data model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A registered account.
///
/// `api_key` is the long-lived identity key: an opaque bearer secret
/// equivalent to a persistent session key. It is generated once at
/// registration and never rotated here; rotation is an external operation.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub is_admin: bool,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Fields needed to create an account; the repository assigns id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub is_admin: bool,
    pub api_key: String,
}

/// Public profile projection. Never exposes the hash or the identity key.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountDto {
    pub id: i64,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            nickname: account.nickname.clone(),
            created_at: account.created_at,
            modified_at: account.modified_at,
        }
    }
}

#[cfg(test)]
impl Account {
    /// Test fixture with a predictable identity key.
    pub fn sample(id: i64, username: &str, nickname: &str, is_admin: bool) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.to_string(),
            password_hash: String::new(),
            nickname: nickname.to_string(),
            is_admin,
            api_key: format!("key-{id}"),
            created_at: now,
            modified_at: now,
        }
    }
}
