//! The combined bearer credential and its issuer.
//!
//! A client holds exactly one bearer artifact: `"<apiKey> <accessToken>"`,
//! the access-token segment optional. It travels in the `Authorization`
//! header or split across the `apiKey` / `accessToken` cookies.

use axum_extra::extract::cookie::Cookie;
use serde::Serialize;
use utoipa::ToSchema;

use super::claims::{self, AccessClaims};
use crate::account::models::Account;
use crate::config::AuthConfig;
use crate::error::{ApiError, ErrorCode};

/// Cookie carrying the identity key (session lifetime).
pub const API_KEY_COOKIE: &str = "apiKey";
/// Cookie carrying the signed access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Parsed form of `Authorization: Bearer <apiKey>[ <accessToken>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerCredential {
    pub api_key: String,
    pub access_token: Option<String>,
}

impl BearerCredential {
    /// Split a combined credential. The identity key is always the first
    /// segment; everything after the first space is the token segment.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once(' ') {
            Some((key, token)) => Some(Self {
                api_key: key.to_string(),
                access_token: Some(token.trim().to_string()).filter(|t| !t.is_empty()),
            }),
            None => Some(Self {
                api_key: raw.to_string(),
                access_token: None,
            }),
        }
    }
}

/// The credential pair handed to a client at login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssuedCredential {
    pub api_key: String,
    pub access_token: String,
}

/// Issues access tokens and combined credentials from the configured
/// secret and time-to-live. Pure function of account + current time; safe
/// to share across requests.
#[derive(Clone)]
pub struct CredentialIssuer {
    secret: String,
    ttl_secs: i64,
    cookie_domain: String,
}

impl CredentialIssuer {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            secret: auth.jwt_secret.clone(),
            ttl_secs: auth.access_token_ttl_secs,
            cookie_domain: auth.cookie_domain.clone(),
        }
    }

    /// Sign a fresh access token for the account.
    pub fn issue_access_token(&self, account: &Account) -> Result<String, ApiError> {
        claims::sign(&self.secret, self.ttl_secs, account.id, &account.username).map_err(|e| {
            ApiError::new(ErrorCode::InternalError, format!("token signing failed: {e}"))
        })
    }

    /// Verify an access token; uniform `None` on any failure.
    pub fn verify_access_token(&self, token: &str) -> Option<AccessClaims> {
        claims::verify(&self.secret, token)
    }

    /// Pair the account's stored identity key with a fresh access token.
    pub fn issue_credential(&self, account: &Account) -> Result<IssuedCredential, ApiError> {
        Ok(IssuedCredential {
            api_key: account.api_key.clone(),
            access_token: self.issue_access_token(account)?,
        })
    }

    /// Session cookie carrying one credential segment: HttpOnly, Secure,
    /// scoped to the serving domain, no explicit expiry.
    pub fn auth_cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .domain(self.cookie_domain.clone())
            .path("/")
            .http_only(true)
            .secure(true)
            .build()
    }

    /// Expired cookie (Max-Age 0) used to clear a credential segment at
    /// logout.
    pub fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.auth_cookie(name, String::new());
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> CredentialIssuer {
        CredentialIssuer::new(&AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef0123456789abcdef".to_string(),
            access_token_ttl_secs: 3600,
            cookie_domain: "localhost".to_string(),
        })
    }

    fn account() -> Account {
        Account::sample(7, "user1", "Aria", false)
    }

    #[test]
    fn test_parse_key_and_token() {
        let cred = BearerCredential::parse("key-123 tok.en.sig").unwrap();
        assert_eq!(cred.api_key, "key-123");
        assert_eq!(cred.access_token.as_deref(), Some("tok.en.sig"));
    }

    #[test]
    fn test_parse_key_only() {
        let cred = BearerCredential::parse("key-123").unwrap();
        assert_eq!(cred.api_key, "key-123");
        assert_eq!(cred.access_token, None);

        // Trailing space still means "no token segment"
        let cred = BearerCredential::parse("key-123 ").unwrap();
        assert_eq!(cred.access_token, None);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(BearerCredential::parse(""), None);
        assert_eq!(BearerCredential::parse("   "), None);
    }

    #[test]
    fn test_issued_credential_pairs_key_with_fresh_token() {
        let issuer = issuer();
        let account = account();
        let cred = issuer.issue_credential(&account).unwrap();

        assert_eq!(cred.api_key, account.api_key);
        let claims = issuer.verify_access_token(&cred.access_token).unwrap();
        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.username, account.username);
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = issuer().auth_cookie(API_KEY_COOKIE, "abc".to_string());
        let rendered = cookie.to_string();
        assert!(rendered.contains("apiKey=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Domain=localhost"));
        assert!(rendered.contains("Path=/"));
        assert!(!rendered.contains("Max-Age"));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = issuer().removal_cookie(ACCESS_TOKEN_COOKIE);
        let rendered = cookie.to_string();
        assert!(rendered.contains("accessToken="));
        assert!(rendered.contains("Max-Age=0"));
    }
}
