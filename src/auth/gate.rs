//! Request authentication gate.
//!
//! Every request passes through this middleware before any handler runs.
//! Per-request outcomes:
//!
//! - **Anonymous** — no credential supplied; public endpoints stay
//!   reachable and protected handlers raise their own 401.
//! - **Authenticated** — the actor is resolved and placed in request
//!   extensions for the rest of the request, never cached beyond it.
//! - **Rejected** — unknown identity key or token/key mismatch; surfaced
//!   as a 401 and never downgraded to Anonymous.
//!
//! The identity key is the durable secret; the access token is a
//! short-lived convenience. A missing, malformed or expired token next to
//! a known key is repaired in place: the gate reissues a token and
//! attaches it to the response as an updated `accessToken` cookie, so the
//! client never has to re-authenticate.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::credential::{ACCESS_TOKEN_COOKIE, API_KEY_COOKIE, BearerCredential};
use crate::account::models::Account;
use crate::error::{ApiError, ErrorCode};
use crate::gateway::state::AppState;

/// The account resolved for the current request, or absence thereof.
#[derive(Debug, Clone)]
pub struct ResolvedActor(Option<Account>);

impl ResolvedActor {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(account: Account) -> Self {
        Self(Some(account))
    }

    pub fn get(&self) -> Option<&Account> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    /// The actor, or the 401 an endpoint must surface when it requires one.
    pub fn require(&self) -> Result<&Account, ApiError> {
        self.0
            .as_ref()
            .ok_or_else(|| ApiError::from_code(ErrorCode::Unauthenticated))
    }
}

/// Session bootstrap/teardown endpoints. Stale cookies must never lock a
/// client out of re-authentication, so these resolve as Anonymous without
/// touching the credential.
fn is_session_bootstrap(path: &str) -> bool {
    matches!(
        path,
        "/api/v1/members/join" | "/api/v1/members/login" | "/api/v1/members/logout"
    )
}

pub async fn authentication_gate(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if is_session_bootstrap(request.uri().path()) {
        request.extensions_mut().insert(ResolvedActor::anonymous());
        return Ok(next.run(request).await);
    }

    // Step 1: Credential from the Authorization header, else the cookie pair
    let Some(credential) = extract_credential(request.headers(), &jar) else {
        request.extensions_mut().insert(ResolvedActor::anonymous());
        return Ok(next.run(request).await);
    };

    // Step 2: The identity key must resolve to an account
    let account = state
        .accounts
        .resolve_identity_key(&credential.api_key)
        .await?
        .ok_or_else(|| ApiError::from_code(ErrorCode::InvalidCredential))?;

    // Step 3: Token segment. Verified claims must belong to the key's
    // account; a missing or invalid segment falls back to the key alone
    // and triggers a reissue.
    let refreshed = match credential
        .access_token
        .as_deref()
        .and_then(|token| state.issuer.verify_access_token(token))
    {
        Some(claims) if claims.sub == account.id => None,
        Some(claims) => {
            tracing::warn!(
                account_id = account.id,
                claims_sub = claims.sub,
                "access token does not match identity key"
            );
            return Err(ApiError::new(
                ErrorCode::InvalidCredential,
                "access token does not match the identity key",
            ));
        }
        None => Some(state.issuer.issue_access_token(&account)?),
    };

    // Step 4: Expose the actor for the remainder of the request
    request
        .extensions_mut()
        .insert(ResolvedActor::authenticated(account));

    let response = next.run(request).await;

    // Step 5: Attach the repaired token as an updated cookie
    if let Some(token) = refreshed {
        let refresh_jar = CookieJar::new().add(state.issuer.auth_cookie(ACCESS_TOKEN_COOKIE, token));
        return Ok((refresh_jar, response).into_response());
    }
    Ok(response)
}

/// Pull the combined credential out of the request, header first.
fn extract_credential(headers: &HeaderMap, jar: &CookieJar) -> Option<BearerCredential> {
    if let Some(bearer) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return BearerCredential::parse(bearer);
    }

    let api_key = jar.get(API_KEY_COOKIE)?.value().to_string();
    if api_key.is_empty() {
        return None;
    }
    let access_token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());
    Some(BearerCredential {
        api_key,
        access_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_from_header() {
        let headers = headers_with_auth("Bearer key-1 token-1");
        let cred = extract_credential(&headers, &CookieJar::new()).unwrap();
        assert_eq!(cred.api_key, "key-1");
        assert_eq!(cred.access_token.as_deref(), Some("token-1"));
    }

    #[test]
    fn test_extract_prefers_header_over_cookies() {
        let headers = headers_with_auth("Bearer header-key");
        let jar = CookieJar::new().add(Cookie::new(API_KEY_COOKIE, "cookie-key"));
        let cred = extract_credential(&headers, &jar).unwrap();
        assert_eq!(cred.api_key, "header-key");
    }

    #[test]
    fn test_extract_from_cookies() {
        let jar = CookieJar::new()
            .add(Cookie::new(API_KEY_COOKIE, "cookie-key"))
            .add(Cookie::new(ACCESS_TOKEN_COOKIE, "cookie-token"));
        let cred = extract_credential(&HeaderMap::new(), &jar).unwrap();
        assert_eq!(cred.api_key, "cookie-key");
        assert_eq!(cred.access_token.as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract_credential(&HeaderMap::new(), &CookieJar::new()).is_none());

        // A cleared (empty-valued) cookie is not a credential
        let jar = CookieJar::new().add(Cookie::new(API_KEY_COOKIE, ""));
        assert!(extract_credential(&HeaderMap::new(), &jar).is_none());
    }

    #[test]
    fn test_resolved_actor_require() {
        let anon = ResolvedActor::anonymous();
        assert!(!anon.is_authenticated());
        let err = anon.require().unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);

        let actor = ResolvedActor::authenticated(Account::sample(1, "user1", "Aria", false));
        assert_eq!(actor.require().unwrap().id, 1);
    }
}
