//! Post endpoints.
//!
//! Read access to published posts is anonymous; everything else resolves
//! the actor from the authentication gate and consults the guard before
//! touching the resource.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::models::{PageDto, PostWithContentDto, SearchKeywordType};
use crate::auth::gate::ResolvedActor;
use crate::auth::guard::{can_modify_or_delete, can_read};
use crate::error::{ApiError, ErrorCode};
use crate::gateway::state::AppState;
use crate::gateway::types::ApiResponse;

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    3
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Which field the keyword matches: `title` or `content`
    #[serde(default)]
    pub keyword_type: SearchKeywordType,
    #[serde(default)]
    pub keyword: String,
}

/// Listed posts, paged and searchable
///
/// GET /api/v1/posts
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of listed posts", body = ApiResponse<PageDto>)
    ),
    tag = "Posts"
)]
pub async fn get_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageDto>>, ApiError> {
    let page = state
        .posts
        .get_listed_items(query.page, query.page_size, query.keyword_type, &query.keyword)
        .await?;
    Ok(Json(ApiResponse::success("post list retrieved", page)))
}

/// The acting account's posts
///
/// GET /api/v1/posts/me
#[utoipa::path(
    get,
    path = "/api/v1/posts/me",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of the actor's posts", body = ApiResponse<PageDto>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
pub async fn get_mines(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageDto>>, ApiError> {
    let account = actor.require()?;
    let page = state
        .posts
        .get_mines(
            account,
            query.page,
            query.page_size,
            query.keyword_type,
            &query.keyword,
        )
        .await?;
    Ok(Json(ApiResponse::success("my post list retrieved", page)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResBody {
    pub post_count: i64,
    pub post_published_count: i64,
    pub post_listed_count: i64,
}

/// Post statistics (administrators only)
///
/// GET /api/v1/posts/statistics
#[utoipa::path(
    get,
    path = "/api/v1/posts/statistics",
    responses(
        (status = 200, description = "Post counts", body = ApiResponse<StatisticsResBody>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator")
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
) -> Result<Json<ApiResponse<StatisticsResBody>>, ApiError> {
    let account = actor.require()?;
    if !account.is_admin {
        return Err(ApiError::new(
            ErrorCode::Forbidden,
            "administrators only",
        ));
    }

    let stats = state.posts.statistics().await?;
    Ok(Json(ApiResponse::success(
        "statistics retrieved",
        StatisticsResBody {
            post_count: stats.post_count,
            post_published_count: stats.post_published_count,
            post_listed_count: stats.post_listed_count,
        },
    )))
}

/// Single post
///
/// Published posts are readable by anyone; private posts only by their
/// author or an administrator.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = ApiResponse<PostWithContentDto>),
        (status = 401, description = "Private post, no credential"),
        (status = 403, description = "Private post, not the author"),
        (status = 404, description = "No such post")
    ),
    tag = "Posts"
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PostWithContentDto>>, ApiError> {
    let post = state.posts.get_item(id).await?;
    can_read(actor.get(), &post)?;

    Ok(Json(ApiResponse::success(
        format!("post {id} retrieved"),
        PostWithContentDto::from(&post),
    )))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WriteReqBody {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub content: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub listed: bool,
}

/// Write a post
///
/// POST /api/v1/posts
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = WriteReqBody,
    responses(
        (status = 201, description = "Post created", body = ApiResponse<PostWithContentDto>),
        (status = 400, description = "Blank field"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
pub async fn write(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
    Json(body): Json<WriteReqBody>,
) -> Result<(StatusCode, Json<ApiResponse<PostWithContentDto>>), ApiError> {
    let account = actor.require()?;
    body.validate()
        .map_err(|e| ApiError::invalid_parameter(e.to_string()))?;

    let post = state
        .posts
        .write(account, &body.title, &body.content, body.published, body.listed)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            format!("post {} created", post.id),
            PostWithContentDto::from(&post),
        )),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ModifyReqBody {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub content: String,
}

/// Modify a post (author or administrator)
///
/// PUT /api/v1/posts/{id}
#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    params(("id" = i64, Path, description = "Post id")),
    request_body = ModifyReqBody,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostWithContentDto>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
pub async fn modify(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
    Path(id): Path<i64>,
    Json(body): Json<ModifyReqBody>,
) -> Result<Json<ApiResponse<PostWithContentDto>>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::invalid_parameter(e.to_string()))?;

    let post = state.posts.get_item(id).await?;
    can_modify_or_delete(actor.get(), &post)?;

    let post = state.posts.modify(post, &body.title, &body.content).await?;
    Ok(Json(ApiResponse::success(
        format!("post {id} updated"),
        PostWithContentDto::from(&post),
    )))
}

/// Delete a post (author or administrator)
///
/// DELETE /api/v1/posts/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post")
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let post = state.posts.get_item(id).await?;
    can_modify_or_delete(actor.get(), &post)?;

    state.posts.delete(&post).await?;
    Ok(Json(ApiResponse::message(format!("post {id} deleted"))))
}
