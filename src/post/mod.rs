//! Posts and their comments: model, storage, service, API.

pub mod comments;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use models::{
    Comment, CommentDto, NewPost, PageDto, Post, PostDto, PostWithContentDto, SearchKeywordType,
};
pub use repository::{MemoryPostRepository, PgPostRepository, PostQuery, PostRepository};
pub use service::{PostService, PostStatistics};
