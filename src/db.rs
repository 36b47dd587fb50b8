//! PostgreSQL connection management and the storage error type.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::error::{ApiError, ErrorCode};

/// Storage failure surfaced by repositories.
///
/// "Not found" is never an error at this layer; repositories return an
/// explicit `Option` for absent rows.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        tracing::error!("storage failure: {}", err);
        ApiError::new(ErrorCode::InternalError, "storage failure")
    }
}

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
