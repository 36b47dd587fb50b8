//! Post and comment operations over the repository.

use std::sync::Arc;

use super::models::{Comment, NewPost, PageDto, Post, PostDto, SearchKeywordType};
use super::repository::{PostQuery, PostRepository};
use crate::account::models::Account;
use crate::error::ApiError;

/// Post statistics for the admin endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PostStatistics {
    pub post_count: i64,
    pub post_published_count: i64,
    pub post_listed_count: i64,
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    pub async fn write(
        &self,
        author: &Account,
        title: &str,
        content: &str,
        published: bool,
        listed: bool,
    ) -> Result<Post, ApiError> {
        let post = self
            .repo
            .insert(NewPost {
                author_id: author.id,
                author_nickname: author.nickname.clone(),
                title: title.to_string(),
                content: content.to_string(),
                published,
                listed,
            })
            .await?;
        tracing::info!(post_id = post.id, author_id = author.id, "post written");
        Ok(post)
    }

    /// The post, or the 404 every caller would otherwise map by hand.
    pub async fn get_item(&self, id: i64) -> Result<Post, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("post does not exist"))
    }

    pub async fn modify(&self, mut post: Post, title: &str, content: &str) -> Result<Post, ApiError> {
        post.title = title.to_string();
        post.content = content.to_string();
        post.modified_at = chrono::Utc::now();
        self.repo.update(&post).await?;
        Ok(post)
    }

    pub async fn delete(&self, post: &Post) -> Result<(), ApiError> {
        self.repo.delete(post.id).await?;
        tracing::info!(post_id = post.id, "post deleted");
        Ok(())
    }

    pub async fn get_listed_items(
        &self,
        page: i64,
        page_size: i64,
        keyword_type: SearchKeywordType,
        keyword: &str,
    ) -> Result<PageDto, ApiError> {
        let query = Self::query(page, page_size, keyword_type, keyword);
        let (posts, total) = self.repo.list_listed(&query).await?;
        Ok(Self::page(posts, total, &query))
    }

    pub async fn get_mines(
        &self,
        author: &Account,
        page: i64,
        page_size: i64,
        keyword_type: SearchKeywordType,
        keyword: &str,
    ) -> Result<PageDto, ApiError> {
        let query = Self::query(page, page_size, keyword_type, keyword);
        let (posts, total) = self.repo.list_by_author(author.id, &query).await?;
        Ok(Self::page(posts, total, &query))
    }

    pub async fn statistics(&self) -> Result<PostStatistics, ApiError> {
        Ok(PostStatistics {
            post_count: self.repo.count().await?,
            post_published_count: self.repo.count_published().await?,
            post_listed_count: self.repo.count_listed().await?,
        })
    }

    pub async fn add_comment(
        &self,
        post: &Post,
        author: &Account,
        content: &str,
    ) -> Result<Comment, ApiError> {
        let comment = self
            .repo
            .add_comment(post.id, author.id, &author.nickname, content)
            .await?;
        tracing::info!(
            post_id = post.id,
            comment_id = comment.id,
            author_id = author.id,
            "comment written"
        );
        Ok(comment)
    }

    pub async fn modify_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment, ApiError> {
        self.repo
            .update_comment(post_id, comment_id, content)
            .await?
            .ok_or_else(|| ApiError::not_found("comment does not exist"))
    }

    pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<(), ApiError> {
        if !self.repo.delete_comment(post_id, comment_id).await? {
            return Err(ApiError::not_found("comment does not exist"));
        }
        Ok(())
    }

    fn query(
        page: i64,
        page_size: i64,
        keyword_type: SearchKeywordType,
        keyword: &str,
    ) -> PostQuery {
        PostQuery {
            page: page.max(1),
            page_size: page_size.clamp(1, 100),
            keyword_type,
            keyword: keyword.to_string(),
        }
    }

    fn page(posts: Vec<Post>, total_items: i64, query: &PostQuery) -> PageDto {
        PageDto {
            items: posts.iter().map(PostDto::from).collect(),
            total_pages: (total_items + query.page_size - 1) / query.page_size,
            total_items,
            current_page_no: query.page,
            page_size: query.page_size,
        }
    }
}
