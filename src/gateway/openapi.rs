//! OpenAPI documentation.
//!
//! The document is served as JSON at `/api-docs/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::handlers::{JoinReqBody, LoginReqBody, LoginResBody};
use crate::account::models::AccountDto;
use crate::gateway::types::HealthResponse;
use crate::post::comments::CommentReqBody;
use crate::post::handlers::{ModifyReqBody, StatisticsResBody, WriteReqBody};
use crate::post::models::{CommentDto, PageDto, PostDto, PostWithContentDto};

/// Combined-credential bearer scheme: `Bearer <apiKey>[ <accessToken>]`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Combined credential: `Bearer <apiKey> <accessToken>`. \
                             The access-token segment is optional; a valid apiKey \
                             alone authenticates and a fresh token is returned as \
                             the `accessToken` cookie.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "inkpress API",
        version = "0.1.0",
        description = "Content service backend: posts, comments and accounts.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::health_check,
        crate::account::handlers::join,
        crate::account::handlers::login,
        crate::account::handlers::logout,
        crate::account::handlers::me,
        crate::post::handlers::get_items,
        crate::post::handlers::get_mines,
        crate::post::handlers::get_statistics,
        crate::post::handlers::get_item,
        crate::post::handlers::write,
        crate::post::handlers::modify,
        crate::post::handlers::delete_item,
        crate::post::comments::get_items,
        crate::post::comments::get_item,
        crate::post::comments::write,
        crate::post::comments::modify,
        crate::post::comments::delete_item,
    ),
    components(
        schemas(
            AccountDto,
            JoinReqBody,
            LoginReqBody,
            LoginResBody,
            PostDto,
            PostWithContentDto,
            PageDto,
            CommentDto,
            CommentReqBody,
            WriteReqBody,
            ModifyReqBody,
            StatisticsResBody,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Members", description = "Accounts and sessions"),
        (name = "Posts", description = "Post CRUD"),
        (name = "Comments", description = "Comments under a post"),
        (name = "System", description = "Service endpoints")
    )
)]
pub struct ApiDoc;
