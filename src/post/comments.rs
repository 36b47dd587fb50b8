//! Comment endpoints, nested under their post.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::models::CommentDto;
use crate::auth::gate::ResolvedActor;
use crate::auth::guard::can_modify_or_delete;
use crate::error::ApiError;
use crate::gateway::state::AppState;
use crate::gateway::types::ApiResponse;

/// Comments of a post
///
/// GET /api/v1/posts/{post_id}/comments
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "All comments of the post", body = ApiResponse<Vec<CommentDto>>),
        (status = 404, description = "No such post")
    ),
    tag = "Comments"
)]
pub async fn get_items(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CommentDto>>>, ApiError> {
    let post = state.posts.get_item(post_id).await?;
    let comments: Vec<CommentDto> = post.comments.iter().map(CommentDto::from).collect();
    Ok(Json(ApiResponse::success("comment list retrieved", comments)))
}

/// Single comment
///
/// GET /api/v1/posts/{post_id}/comments/{id}
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/comments/{id}",
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "The comment", body = ApiResponse<CommentDto>),
        (status = 404, description = "No such post or comment")
    ),
    tag = "Comments"
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path((post_id, id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    let post = state.posts.get_item(post_id).await?;
    let comment = post
        .comment(id)
        .ok_or_else(|| ApiError::not_found("comment does not exist"))?;
    Ok(Json(ApiResponse::success(
        format!("comment {id} retrieved"),
        CommentDto::from(comment),
    )))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentReqBody {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub content: String,
}

/// Write a comment
///
/// POST /api/v1/posts/{post_id}/comments
#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body = CommentReqBody,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<CommentDto>),
        (status = 400, description = "Blank content"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such post")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn write(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
    Path(post_id): Path<i64>,
    Json(body): Json<CommentReqBody>,
) -> Result<(StatusCode, Json<ApiResponse<CommentDto>>), ApiError> {
    let account = actor.require()?;
    body.validate()
        .map_err(|e| ApiError::invalid_parameter(e.to_string()))?;

    let post = state.posts.get_item(post_id).await?;
    let comment = state.posts.add_comment(&post, account, &body.content).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            format!("comment {} created", comment.id),
            CommentDto::from(&comment),
        )),
    ))
}

/// Modify a comment (author or administrator)
///
/// PUT /api/v1/posts/{post_id}/comments/{id}
#[utoipa::path(
    put,
    path = "/api/v1/posts/{post_id}/comments/{id}",
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentReqBody,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentDto>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post or comment")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn modify(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
    Path((post_id, id)): Path<(i64, i64)>,
    Json(body): Json<CommentReqBody>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::invalid_parameter(e.to_string()))?;

    let post = state.posts.get_item(post_id).await?;
    let comment = post
        .comment(id)
        .ok_or_else(|| ApiError::not_found("comment does not exist"))?;
    can_modify_or_delete(actor.get(), comment)?;

    let comment = state.posts.modify_comment(post_id, id, &body.content).await?;
    Ok(Json(ApiResponse::success(
        format!("comment {id} updated"),
        CommentDto::from(&comment),
    )))
}

/// Delete a comment (author or administrator)
///
/// DELETE /api/v1/posts/{post_id}/comments/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post_id}/comments/{id}",
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such post or comment")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ResolvedActor>,
    Path((post_id, id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let post = state.posts.get_item(post_id).await?;
    let comment = post
        .comment(id)
        .ok_or_else(|| ApiError::not_found("comment does not exist"))?;
    can_modify_or_delete(actor.get(), comment)?;

    state.posts.delete_comment(post_id, id).await?;
    Ok(Json(ApiResponse::message(format!("comment {id} deleted"))))
}
