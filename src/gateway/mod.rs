//! HTTP gateway: router assembly and server bootstrap.
//!
//! Every route is piped through the authentication gate before its handler
//! runs; handlers decide for themselves whether anonymous access is
//! permitted.

pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::account::handlers as members;
use crate::auth::gate::authentication_gate;
use crate::config::AppConfig;
use crate::post::{comments, handlers as posts};
use state::AppState;
use types::{ApiResponse, HealthResponse};

/// API server home
async fn home() -> &'static str {
    "Welcome to the inkpress API server."
}

/// Health check endpoint
///
/// GET /api/v1/health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>)
    ),
    tag = "System"
)]
pub async fn health_check(
    State(_state): State<Arc<AppState>>,
) -> Json<ApiResponse<HealthResponse>> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Json(ApiResponse::success(
        "ok",
        HealthResponse { timestamp_ms: now_ms },
    ))
}

/// OpenAPI document as JSON
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

/// Assemble the full router over the shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/v1/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        // Members
        .route("/api/v1/members/join", post(members::join))
        .route("/api/v1/members/login", post(members::login))
        .route("/api/v1/members/logout", delete(members::logout))
        .route("/api/v1/members/me", get(members::me))
        // Posts
        .route("/api/v1/posts", get(posts::get_items).post(posts::write))
        .route("/api/v1/posts/me", get(posts::get_mines))
        .route("/api/v1/posts/statistics", get(posts::get_statistics))
        .route(
            "/api/v1/posts/{id}",
            get(posts::get_item)
                .put(posts::modify)
                .delete(posts::delete_item),
        )
        // Comments
        .route(
            "/api/v1/posts/{post_id}/comments",
            get(comments::get_items).post(comments::write),
        )
        .route(
            "/api/v1/posts/{post_id}/comments/{id}",
            get(comments::get_item)
                .put(comments::modify)
                .delete(comments::delete_item),
        )
        .layer(from_fn_with_state(state.clone(), authentication_gate))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(config: &AppConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
