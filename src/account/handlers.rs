//! Member endpoints: join, login, me, logout.

use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::models::AccountDto;
use crate::auth::credential::{ACCESS_TOKEN_COOKIE, API_KEY_COOKIE};
use crate::auth::gate::ResolvedActor;
use crate::error::ApiError;
use crate::gateway::state::AppState;
use crate::gateway::types::ApiResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct JoinReqBody {
    #[validate(length(min = 1, message = "must not be blank"))]
    #[schema(example = "user1")]
    pub username: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    #[schema(example = "user11234")]
    pub password: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    #[schema(example = "Aria")]
    pub nickname: String,
}

/// Register a new member
///
/// POST /api/v1/members/join
#[utoipa::path(
    post,
    path = "/api/v1/members/join",
    request_body = JoinReqBody,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AccountDto>),
        (status = 400, description = "Blank field"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Members"
)]
pub async fn join(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JoinReqBody>,
) -> Result<(StatusCode, Json<ApiResponse<AccountDto>>), ApiError> {
    body.validate()
        .map_err(|e| ApiError::invalid_parameter(e.to_string()))?;

    let account = state
        .accounts
        .register(&body.username, &body.password, &body.nickname)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "signup complete",
            AccountDto::from(&account),
        )),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginReqBody {
    #[validate(length(min = 1, message = "must not be blank"))]
    #[schema(example = "user1")]
    pub username: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    #[schema(example = "user11234")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResBody {
    pub item: AccountDto,
    pub api_key: String,
    pub access_token: String,
}

/// Login and receive the combined credential
///
/// Returns the credential pair in the body and sets it as the `apiKey`
/// and `accessToken` cookies.
#[utoipa::path(
    post,
    path = "/api/v1/members/login",
    request_body = LoginReqBody,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResBody>),
        (status = 400, description = "Blank field"),
        (status = 401, description = "Unknown username or wrong password")
    ),
    tag = "Members"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginReqBody>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResBody>>), ApiError> {
    body.validate()
        .map_err(|e| ApiError::invalid_parameter(e.to_string()))?;

    let (account, credential) = state.accounts.login(&body.username, &body.password).await?;

    let jar = jar
        .add(
            state
                .issuer
                .auth_cookie(API_KEY_COOKIE, credential.api_key.clone()),
        )
        .add(
            state
                .issuer
                .auth_cookie(ACCESS_TOKEN_COOKIE, credential.access_token.clone()),
        );

    Ok((
        jar,
        Json(ApiResponse::success(
            format!("welcome back, {}", account.nickname),
            LoginResBody {
                item: AccountDto::from(&account),
                api_key: credential.api_key,
                access_token: credential.access_token,
            },
        )),
    ))
}

/// Logout
///
/// Clears both credential cookies (Max-Age 0). Idempotent; requires no
/// prior authentication — there is no server-side session to revoke.
#[utoipa::path(
    delete,
    path = "/api/v1/members/logout",
    responses(
        (status = 200, description = "Cookies cleared")
    ),
    tag = "Members"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    let jar = jar
        .add(state.issuer.removal_cookie(API_KEY_COOKIE))
        .add(state.issuer.removal_cookie(ACCESS_TOKEN_COOKIE));
    (jar, Json(ApiResponse::message("logged out")))
}

/// Current member profile
///
/// GET /api/v1/members/me
#[utoipa::path(
    get,
    path = "/api/v1/members/me",
    responses(
        (status = 200, description = "Profile of the acting account", body = ApiResponse<AccountDto>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn me(
    Extension(actor): Extension<ResolvedActor>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let account = actor.require()?;
    Ok(Json(ApiResponse::success(
        "profile retrieved",
        AccountDto::from(account),
    )))
}
