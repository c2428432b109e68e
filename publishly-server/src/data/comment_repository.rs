use std::collections::HashMap;

use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError>;
    /// Comments on a post, newest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError>;
    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create comment: {}", e);
            DomainError::from(e)
        })?;

        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, content, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to list comments of post {}: {}", post_id, e);
            DomainError::from(e)
        })
    }

    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, DomainError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT post_id, COUNT(*) FROM comments WHERE post_id = ANY($1) GROUP BY post_id",
        )
        .bind(post_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to count comments: {}", e);
            DomainError::from(e)
        })?;

        Ok(rows.into_iter().collect())
    }
}
