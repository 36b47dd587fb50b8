//! Post and comment models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::guard::{Owned, Visible};

/// A post with its embedded comments.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub author_nickname: String,
    pub title: String,
    pub content: String,
    /// Readable by anyone when true; owner/admin only otherwise
    pub published: bool,
    /// Included in the public listing when true
    pub listed: bool,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Post {
    pub fn comment(&self, comment_id: i64) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

impl Owned for Post {
    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

impl Visible for Post {
    fn is_public(&self) -> bool {
        self.published
    }
}

/// Fields needed to create a post; the repository assigns id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub author_nickname: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub listed: bool,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_nickname: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Owned for Comment {
    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

/// Listing projection: no body content.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostDto {
    pub id: i64,
    pub author_id: i64,
    pub author_nickname: String,
    pub title: String,
    pub published: bool,
    pub listed: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<&Post> for PostDto {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            author_nickname: post.author_nickname.clone(),
            title: post.title.clone(),
            published: post.published,
            listed: post.listed,
            created_at: post.created_at,
            modified_at: post.modified_at,
        }
    }
}

/// Detail projection including the body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostWithContentDto {
    pub id: i64,
    pub author_id: i64,
    pub author_nickname: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub listed: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<&Post> for PostWithContentDto {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            author_nickname: post.author_nickname.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            published: post.published,
            listed: post.listed,
            created_at: post.created_at,
            modified_at: post.modified_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentDto {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_nickname: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<&Comment> for CommentDto {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_nickname: comment.author_nickname.clone(),
            content: comment.content.clone(),
            created_at: comment.created_at,
            modified_at: comment.modified_at,
        }
    }
}

/// One page of posts plus paging bookkeeping.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageDto {
    pub items: Vec<PostDto>,
    pub total_pages: i64,
    pub total_items: i64,
    pub current_page_no: i64,
    pub page_size: i64,
}

/// Which field a listing keyword matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchKeywordType {
    #[default]
    Title,
    Content,
}
