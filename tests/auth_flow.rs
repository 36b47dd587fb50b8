//! End-to-end authentication flow over the full router.
//!
//! Pins the credential protocol: login issues the cookie pair, the
//! identity key alone authenticates (with a transparent token reissue),
//! an unknown key is rejected, and logout clears both cookies.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use inkpress::account::repository::MemoryAccountRepository;
use inkpress::account::service::AccountService;
use inkpress::auth::claims;
use inkpress::auth::credential::CredentialIssuer;
use inkpress::config::AuthConfig;
use inkpress::gateway::build_router;
use inkpress::gateway::state::AppState;
use inkpress::post::repository::MemoryPostRepository;
use inkpress::post::service::PostService;

const SECRET: &str = "abcdefghijklmnopqrstuvwxyz1234567890abcdefghijklmnopqrstuvwxyz1234567890";

async fn test_app() -> Router {
    let issuer = CredentialIssuer::new(&AuthConfig {
        jwt_secret: SECRET.to_string(),
        access_token_ttl_secs: 3600,
        cookie_domain: "localhost".to_string(),
    });
    let accounts = AccountService::new(Arc::new(MemoryAccountRepository::new()), issuer.clone());
    let posts = PostService::new(Arc::new(MemoryPostRepository::new()));

    accounts
        .register("admin", "1234", "Administrator")
        .await
        .unwrap();
    accounts
        .register("user1", "user11234", "Aria")
        .await
        .unwrap();
    accounts
        .register("user2", "user21234", "Basil")
        .await
        .unwrap();

    build_router(Arc::new(AppState::new(accounts, posts, issuer)))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Login and return (account id, api_key, access_token).
async fn login(app: &Router, username: &str, password: &str) -> (i64, String, String) {
    let response = send(
        app,
        "POST",
        "/api/v1/members/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    (
        body["data"]["item"]["id"].as_i64().unwrap(),
        body["data"]["api_key"].as_str().unwrap().to_string(),
        body["data"]["access_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_login_sets_both_credential_cookies() {
    let app = test_app().await;
    let response = send(
        &app,
        "POST",
        "/api/v1/members/login",
        None,
        Some(json!({ "username": "user1", "password": "user11234" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let api_key = cookies
        .iter()
        .find(|c| c.starts_with("apiKey="))
        .expect("apiKey cookie");
    let access_token = cookies
        .iter()
        .find(|c| c.starts_with("accessToken="))
        .expect("accessToken cookie");

    for cookie in [api_key, access_token] {
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Domain=localhost"));
        assert!(cookie.contains("Path=/"));
    }
    // Session lifetime: no explicit expiry on the identity-key cookie
    assert!(!api_key.contains("Max-Age"));
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let app = test_app().await;
    let response = send(
        &app,
        "POST",
        "/api/v1/members/login",
        None,
        Some(json!({ "username": "user1", "password": "nope" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], 2002);
}

#[tokio::test]
async fn test_identity_key_alone_authenticates_and_refreshes() {
    let app = test_app().await;
    let (id, api_key, _) = login(&app, "user1", "user11234").await;

    // Only the identity key segment, no access token at all
    let response = send(&app, "GET", "/api/v1/members/me", Some(&api_key), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let refreshed = cookies
        .iter()
        .find(|c| c.starts_with("accessToken="))
        .expect("a fresh access token must be attached");
    assert!(refreshed.contains("HttpOnly"));

    let body = json_body(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["id"].as_i64().unwrap(), id);
}

#[tokio::test]
async fn test_garbled_token_falls_back_to_identity_key() {
    let app = test_app().await;
    let (id, api_key, _) = login(&app, "user1", "user11234").await;

    let credential = format!("{api_key} not.a.token");
    let response = send(&app, "GET", "/api/v1/members/me", Some(&credential), None).await;
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "an invalid token next to a valid key is not an authentication failure"
    );
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("accessToken=")),
        "the gate must reissue a token"
    );
    assert_eq!(json_body(response).await["data"]["id"].as_i64().unwrap(), id);
}

#[tokio::test]
async fn test_expired_token_falls_back_to_identity_key() {
    let app = test_app().await;
    let (id, api_key, _) = login(&app, "user1", "user11234").await;

    let expired = claims::sign(SECRET, -5, id, "user1").unwrap();
    let credential = format!("{api_key} {expired}");
    let response = send(&app, "GET", "/api/v1/members/me", Some(&credential), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let refreshed = cookies
        .iter()
        .find(|c| c.starts_with("accessToken="))
        .expect("expired token must be replaced");
    // The reissued token is a working one
    let new_token = refreshed
        .strip_prefix("accessToken=")
        .unwrap()
        .split(';')
        .next()
        .unwrap();
    assert!(claims::verify(SECRET, new_token).is_some());
}

#[tokio::test]
async fn test_valid_token_passes_without_refresh() {
    let app = test_app().await;
    let (_, api_key, access_token) = login(&app, "user1", "user11234").await;

    let credential = format!("{api_key} {access_token}");
    let response = send(&app, "GET", "/api/v1/members/me", Some(&credential), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("accessToken=")),
        "a valid token needs no reissue"
    );
}

#[tokio::test]
async fn test_unknown_identity_key_rejected() {
    let app = test_app().await;

    let response = send(&app, "GET", "/api/v1/members/me", Some("no-such-key"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], 2002);

    // The token segment cannot rescue an unknown key
    let (_, _, access_token) = login(&app, "user1", "user11234").await;
    let credential = format!("no-such-key {access_token}");
    let response = send(&app, "GET", "/api/v1/members/me", Some(&credential), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], 2002);
}

#[tokio::test]
async fn test_token_for_other_account_rejected() {
    let app = test_app().await;
    let (_, key1, _) = login(&app, "user1", "user11234").await;
    let (_, _, token2) = login(&app, "user2", "user21234").await;

    let credential = format!("{key1} {token2}");
    let response = send(&app, "GET", "/api/v1/members/me", Some(&credential), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], 2002);
}

#[tokio::test]
async fn test_cookie_pair_authenticates() {
    let app = test_app().await;
    let (id, api_key, _) = login(&app, "user1", "user11234").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/members/me")
        .header(header::COOKIE, format!("apiKey={api_key}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Cookie carrier gets the same transparent refresh
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("accessToken="))
    );
    assert_eq!(json_body(response).await["data"]["id"].as_i64().unwrap(), id);
}

#[tokio::test]
async fn test_anonymous_where_actor_required() {
    let app = test_app().await;
    let response = send(&app, "GET", "/api/v1/members/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    // Distinct code from InvalidCredential: nothing was supplied at all
    assert_eq!(json_body(response).await["code"], 2001);
}

#[tokio::test]
async fn test_anonymous_public_endpoint_accessible() {
    let app = test_app().await;
    let response = send(&app, "GET", "/api/v1/posts", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_both_cookies() {
    let app = test_app().await;
    let response = send(&app, "DELETE", "/api/v1/members/logout", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let api_key = cookies
        .iter()
        .find(|c| c.starts_with("apiKey="))
        .expect("apiKey removal cookie");
    let access_token = cookies
        .iter()
        .find(|c| c.starts_with("accessToken="))
        .expect("accessToken removal cookie");
    assert!(api_key.contains("Max-Age=0"));
    assert!(access_token.contains("Max-Age=0"));

    // A follow-up request without credentials resolves Anonymous
    let response = send(&app, "GET", "/api/v1/posts", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_ignores_stale_cookies() {
    let app = test_app().await;
    // A bogus identity key must not lock the client out of logout
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/v1/members/logout")
        .header(header::COOKIE, "apiKey=bogus; accessToken=bogus")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
