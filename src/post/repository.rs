//! Post storage behind a narrow interface.
//!
//! Same split as the account store: an in-memory implementation (default
//! and test double) and a PostgreSQL implementation using runtime queries.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::atomic::{AtomicI64, Ordering};

use super::models::{Comment, NewPost, Post, SearchKeywordType};
use crate::db::RepoError;

/// Paging and keyword filter for listings. `page` is 1-based.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub page: i64,
    pub page_size: i64,
    pub keyword_type: SearchKeywordType,
    pub keyword: String,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, new: NewPost) -> Result<Post, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;
    /// Persist title/content/flags changes. Comments are managed through
    /// the comment operations below.
    async fn update(&self, post: &Post) -> Result<(), RepoError>;
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;

    async fn add_comment(
        &self,
        post_id: i64,
        author_id: i64,
        author_nickname: &str,
        content: &str,
    ) -> Result<Comment, RepoError>;
    async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Option<Comment>, RepoError>;
    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<bool, RepoError>;

    /// Listed posts, newest first, with the total match count.
    async fn list_listed(&self, query: &PostQuery) -> Result<(Vec<Post>, i64), RepoError>;
    /// One author's posts, newest first, with the total match count.
    async fn list_by_author(
        &self,
        author_id: i64,
        query: &PostQuery,
    ) -> Result<(Vec<Post>, i64), RepoError>;

    async fn count(&self) -> Result<i64, RepoError>;
    async fn count_published(&self) -> Result<i64, RepoError>;
    async fn count_listed(&self) -> Result<i64, RepoError>;
}

fn keyword_matches(post: &Post, keyword_type: SearchKeywordType, keyword: &str) -> bool {
    if keyword.is_empty() {
        return true;
    }
    match keyword_type {
        SearchKeywordType::Title => post.title.contains(keyword),
        SearchKeywordType::Content => post.content.contains(keyword),
    }
}

fn paginate(mut posts: Vec<Post>, query: &PostQuery) -> (Vec<Post>, i64) {
    posts.sort_by(|a, b| b.id.cmp(&a.id));
    let total = posts.len() as i64;
    let offset = ((query.page - 1) * query.page_size).max(0) as usize;
    let page = posts
        .into_iter()
        .skip(offset)
        .take(query.page_size.max(0) as usize)
        .collect();
    (page, total)
}

/// Thread-safe in-memory post store.
pub struct MemoryPostRepository {
    posts: DashMap<i64, Post>,
    next_id: AtomicI64,
    next_comment_id: AtomicI64,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: DashMap::new(),
            next_id: AtomicI64::new(1),
            next_comment_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, new: NewPost) -> Result<Post, RepoError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let post = Post {
            id,
            author_id: new.author_id,
            author_nickname: new.author_nickname,
            title: new.title,
            content: new.content,
            published: new.published,
            listed: new.listed,
            comments: Vec::new(),
            created_at: now,
            modified_at: now,
        };
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.get(&id).map(|p| p.value().clone()))
    }

    async fn update(&self, post: &Post) -> Result<(), RepoError> {
        if let Some(mut stored) = self.posts.get_mut(&post.id) {
            stored.title = post.title.clone();
            stored.content = post.content.clone();
            stored.published = post.published;
            stored.listed = post.listed;
            stored.modified_at = post.modified_at;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.posts.remove(&id).is_some())
    }

    async fn add_comment(
        &self,
        post_id: i64,
        author_id: i64,
        author_nickname: &str,
        content: &str,
    ) -> Result<Comment, RepoError> {
        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let comment = Comment {
            id,
            post_id,
            author_id,
            author_nickname: author_nickname.to_string(),
            content: content.to_string(),
            created_at: now,
            modified_at: now,
        };
        if let Some(mut post) = self.posts.get_mut(&post_id) {
            post.comments.push(comment.clone());
            post.comments.sort_by_key(|c| c.id);
        }
        Ok(comment)
    }

    async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Option<Comment>, RepoError> {
        let Some(mut post) = self.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        let Some(comment) = post.comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };
        comment.content = content.to_string();
        comment.modified_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<bool, RepoError> {
        let Some(mut post) = self.posts.get_mut(&post_id) else {
            return Ok(false);
        };
        let before = post.comments.len();
        post.comments.retain(|c| c.id != comment_id);
        Ok(post.comments.len() < before)
    }

    async fn list_listed(&self, query: &PostQuery) -> Result<(Vec<Post>, i64), RepoError> {
        let matches: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.listed && keyword_matches(p, query.keyword_type, &query.keyword))
            .map(|p| p.value().clone())
            .collect();
        Ok(paginate(matches, query))
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        query: &PostQuery,
    ) -> Result<(Vec<Post>, i64), RepoError> {
        let matches: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| {
                p.author_id == author_id && keyword_matches(p, query.keyword_type, &query.keyword)
            })
            .map(|p| p.value().clone())
            .collect();
        Ok(paginate(matches, query))
    }

    async fn count(&self) -> Result<i64, RepoError> {
        Ok(self.posts.len() as i64)
    }

    async fn count_published(&self) -> Result<i64, RepoError> {
        Ok(self.posts.iter().filter(|p| p.published).count() as i64)
    }

    async fn count_listed(&self) -> Result<i64, RepoError> {
        Ok(self.posts.iter().filter(|p| p.listed).count() as i64)
    }
}

/// PostgreSQL post store.
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_post(row: &PgRow) -> Result<Post, sqlx::Error> {
        Ok(Post {
            id: row.try_get("id")?,
            author_id: row.try_get("author_id")?,
            author_nickname: row.try_get("author_nickname")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            published: row.try_get("published")?,
            listed: row.try_get("listed")?,
            comments: Vec::new(),
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
        })
    }

    fn row_to_comment(row: &PgRow) -> Result<Comment, sqlx::Error> {
        Ok(Comment {
            id: row.try_get("id")?,
            post_id: row.try_get("post_id")?,
            author_id: row.try_get("author_id")?,
            author_nickname: row.try_get("author_nickname")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
        })
    }

    async fn load_comments(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, author_id, author_nickname, content, created_at, modified_at
            FROM comments WHERE post_id = $1 ORDER BY id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let mut comments = Vec::with_capacity(rows.len());
        for row in rows {
            comments.push(Self::row_to_comment(&row)?);
        }
        Ok(comments)
    }

    fn keyword_column(keyword_type: SearchKeywordType) -> &'static str {
        match keyword_type {
            SearchKeywordType::Title => "title",
            SearchKeywordType::Content => "content",
        }
    }

    fn rows_to_posts(rows: Vec<PgRow>) -> Result<Vec<Post>, RepoError> {
        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            posts.push(Self::row_to_post(&row)?);
        }
        Ok(posts)
    }

    async fn count_where(&self, filter: &str) -> Result<i64, RepoError> {
        let query = format!("SELECT COUNT(*) AS n FROM posts WHERE {filter}");
        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        Ok(row.try_get("n")?)
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, new: NewPost) -> Result<Post, RepoError> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (author_id, author_nickname, title, content, published, listed)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, author_id, author_nickname, title, content, published, listed,
                      created_at, modified_at
            "#,
        )
        .bind(new.author_id)
        .bind(&new.author_nickname)
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.published)
        .bind(new.listed)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::row_to_post(&row)?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, author_id, author_nickname, title, content, published, listed,
                   created_at, modified_at
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut post = Self::row_to_post(&row)?;
        post.comments = self.load_comments(post.id).await?;
        Ok(Some(post))
    }

    async fn update(&self, post: &Post) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, content = $3, published = $4, listed = $5, modified_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.published)
        .bind(post.listed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_comment(
        &self,
        post_id: i64,
        author_id: i64,
        author_nickname: &str,
        content: &str,
    ) -> Result<Comment, RepoError> {
        let row = sqlx::query(
            r#"
            INSERT INTO comments (post_id, author_id, author_nickname, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, author_id, author_nickname, content, created_at, modified_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(author_nickname)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::row_to_comment(&row)?)
    }

    async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Option<Comment>, RepoError> {
        let row = sqlx::query(
            r#"
            UPDATE comments SET content = $3, modified_at = NOW()
            WHERE post_id = $1 AND id = $2
            RETURNING id, post_id, author_id, author_nickname, content, created_at, modified_at
            "#,
        )
        .bind(post_id)
        .bind(comment_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_comment(&r)).transpose().map_err(Into::into)
    }

    async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = $1 AND id = $2")
            .bind(post_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_listed(&self, query: &PostQuery) -> Result<(Vec<Post>, i64), RepoError> {
        let like = format!("%{}%", query.keyword);
        let column = Self::keyword_column(query.keyword_type);
        let offset = ((query.page - 1) * query.page_size).max(0);

        let select = format!(
            "SELECT id, author_id, author_nickname, title, content, published, listed, \
             created_at, modified_at FROM posts \
             WHERE listed = TRUE AND {column} LIKE $1 \
             ORDER BY id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&select)
            .bind(&like)
            .bind(query.page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count = format!(
            "SELECT COUNT(*) AS n FROM posts WHERE listed = TRUE AND {column} LIKE $1"
        );
        let total_row = sqlx::query(&count).bind(&like).fetch_one(&self.pool).await?;

        Ok((Self::rows_to_posts(rows)?, total_row.try_get("n")?))
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        query: &PostQuery,
    ) -> Result<(Vec<Post>, i64), RepoError> {
        let like = format!("%{}%", query.keyword);
        let column = Self::keyword_column(query.keyword_type);
        let offset = ((query.page - 1) * query.page_size).max(0);

        let select = format!(
            "SELECT id, author_id, author_nickname, title, content, published, listed, \
             created_at, modified_at FROM posts \
             WHERE author_id = $1 AND {column} LIKE $2 \
             ORDER BY id DESC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query(&select)
            .bind(author_id)
            .bind(&like)
            .bind(query.page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count = format!(
            "SELECT COUNT(*) AS n FROM posts WHERE author_id = $1 AND {column} LIKE $2"
        );
        let total_row = sqlx::query(&count)
            .bind(author_id)
            .bind(&like)
            .fetch_one(&self.pool)
            .await?;

        Ok((Self::rows_to_posts(rows)?, total_row.try_get("n")?))
    }

    async fn count(&self) -> Result<i64, RepoError> {
        self.count_where("TRUE").await
    }

    async fn count_published(&self) -> Result<i64, RepoError> {
        self.count_where("published = TRUE").await
    }

    async fn count_listed(&self) -> Result<i64, RepoError> {
        self.count_where("listed = TRUE").await
    }
}
