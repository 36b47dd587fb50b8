//! Registration, login and credential issuance.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use uuid::Uuid;

use super::models::{Account, NewAccount};
use super::repository::AccountRepository;
use crate::auth::credential::{CredentialIssuer, IssuedCredential};
use crate::error::{ApiError, ErrorCode};

/// Usernames that carry the administrator role.
const ADMIN_USERNAMES: [&str; 2] = ["system", "admin"];

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
    issuer: CredentialIssuer,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepository>, issuer: CredentialIssuer) -> Self {
        Self { repo, issuer }
    }

    /// Register a new account. The identity key is drawn fresh and
    /// re-drawn on collision.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        nickname: &str,
    ) -> Result<Account, ApiError> {
        if self.repo.find_by_username(username).await?.is_some() {
            return Err(ApiError::conflict("username is already taken"));
        }

        let password_hash = hash_password(password)?;
        let api_key = self.fresh_identity_key().await?;
        let is_admin = ADMIN_USERNAMES.contains(&username);

        let account = self
            .repo
            .insert(NewAccount {
                username: username.to_string(),
                password_hash,
                nickname: nickname.to_string(),
                is_admin,
                api_key,
            })
            .await?;

        tracing::info!(account_id = account.id, username, "account registered");
        Ok(account)
    }

    /// Verify the password and issue the combined credential.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Account, IssuedCredential), ApiError> {
        let account = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::new(ErrorCode::InvalidCredential, "account does not exist"))?;

        verify_password(password, &account.password_hash)?;

        let credential = self.issuer.issue_credential(&account)?;
        tracing::info!(account_id = account.id, "login");
        Ok((account, credential))
    }

    /// Opaque identity key -> account. No mutation; absence is a plain
    /// `None`, never an error.
    pub async fn resolve_identity_key(&self, api_key: &str) -> Result<Option<Account>, ApiError> {
        Ok(self.repo.find_by_api_key(api_key).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Account>, ApiError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn count(&self) -> Result<i64, ApiError> {
        Ok(self.repo.count().await?)
    }

    async fn fresh_identity_key(&self) -> Result<String, ApiError> {
        loop {
            let key = Uuid::new_v4().to_string();
            if self.repo.find_by_api_key(&key).await?.is_none() {
                return Ok(key);
            }
        }
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::internal(format!("stored password hash unreadable: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::new(ErrorCode::InvalidCredential, "password does not match"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::repository::MemoryAccountRepository;
    use crate::config::AuthConfig;

    fn service() -> AccountService {
        let issuer = CredentialIssuer::new(&AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef0123456789abcdef".to_string(),
            access_token_ttl_secs: 3600,
            cookie_domain: "localhost".to_string(),
        });
        AccountService::new(Arc::new(MemoryAccountRepository::new()), issuer)
    }

    #[tokio::test]
    async fn test_register_assigns_identity_key_and_role() {
        let svc = service();
        let user = svc.register("user1", "user11234", "Aria").await.unwrap();
        assert!(!user.is_admin);
        assert!(!user.api_key.is_empty());
        assert_ne!(user.password_hash, "user11234");

        let admin = svc.register("admin", "1234", "Administrator").await.unwrap();
        assert!(admin.is_admin);
        assert_ne!(admin.api_key, user.api_key);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_conflicts() {
        let svc = service();
        svc.register("user1", "user11234", "Aria").await.unwrap();
        let err = svc.register("user1", "other", "Who").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_login_issues_combined_credential() {
        let svc = service();
        let registered = svc.register("user1", "user11234", "Aria").await.unwrap();

        let (account, credential) = svc.login("user1", "user11234").await.unwrap();
        assert_eq!(account.id, registered.id);
        assert_eq!(credential.api_key, registered.api_key);
        assert!(!credential.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_wrong_password_rejected() {
        let svc = service();
        svc.register("user1", "user11234", "Aria").await.unwrap();

        let err = svc.login("user1", "wrong").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredential);

        let err = svc.login("ghost", "whatever").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredential);
    }

    #[tokio::test]
    async fn test_resolve_identity_key() {
        let svc = service();
        let user = svc.register("user1", "user11234", "Aria").await.unwrap();

        let found = svc.resolve_identity_key(&user.api_key).await.unwrap();
        assert_eq!(found.unwrap().id, user.id);
        assert!(svc.resolve_identity_key("unknown").await.unwrap().is_none());
    }
}
