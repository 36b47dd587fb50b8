//! Signed access-token codec: the short-lived half of the credential.
//!
//! Stateless HS256 sign/verify over a compact claims payload. Verification
//! failures are deliberately uniform: malformed, forged and expired tokens
//! all come back as `None`, and the distinction is only logged. Trust
//! decisions must never branch on *why* a token failed.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims embedded in a signed access token. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Owning account id
    pub sub: i64,
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Sign an account's claims into a compact token valid for `ttl_secs`.
///
/// Deterministic given identical inputs and clock value.
pub fn sign(
    secret: &str,
    ttl_secs: i64,
    account_id: i64,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        sub: account_id,
        username: username.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify structure, signature and expiry; return the claims only if all
/// three pass.
pub fn verify(secret: &str, token: &str) -> Option<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is enforced to the second
    validation.leeway = 0;
    match decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Some(data.claims),
        Err(err) => {
            tracing::debug!("access token rejected: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "abcdefghijklmnopqrstuvwxyz1234567890abcdefghijklmnopqrstuvwxyz1234567890";

    #[test]
    fn test_sign_verify_roundtrip() {
        let token = sign(SECRET, 3600, 42, "user1").unwrap();
        let claims = verify(SECRET, &token).expect("fresh token must verify");

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "user1");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        // exp already in the past; zero leeway means instant rejection
        let token = sign(SECRET, -5, 42, "user1").unwrap();
        assert!(verify(SECRET, &token).is_none());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = sign(SECRET, 3600, 42, "user1").unwrap();
        assert!(verify("another-secret-another-secret-another-secret", &token).is_none());
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        assert!(verify(SECRET, "").is_none());
        assert!(verify(SECRET, "not-a-token").is_none());
        assert!(verify(SECRET, "a.b").is_none());
        assert!(verify(SECRET, "a.b.c").is_none());
    }

    #[test]
    fn test_any_signature_mutation_is_detected() {
        let token = sign(SECRET, 3600, 42, "user1").unwrap();
        let (payload, signature) = token.rsplit_once('.').unwrap();

        for i in 0..signature.len() {
            let mut mutated: Vec<char> = signature.chars().collect();
            // Swap for a base64url character that differs in the high bits,
            // so even the final partial symbol decodes to different bytes
            mutated[i] = if matches!(mutated[i], 'A'..='D') { 'Q' } else { 'A' };
            let tampered: String = mutated.into_iter().collect();
            assert!(
                verify(SECRET, &format!("{payload}.{tampered}")).is_none(),
                "mutation at signature byte {i} must invalidate the token"
            );
        }
    }

    #[test]
    fn test_payload_tampering_is_detected() {
        let token = sign(SECRET, 3600, 42, "user1").unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        // Re-use the original signature over a different payload
        let other = sign(SECRET, 3600, 43, "user2").unwrap();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert!(verify(SECRET, &spliced).is_none());
    }
}
