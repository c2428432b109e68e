//! Join tables whose only state is whether a `(subject, object)` row exists:
//! likes (user → post) and follows (follower → followed user).

use std::collections::HashMap;

use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait RelationRepository: Send + Sync {
    async fn exists(&self, subject: Uuid, object: Uuid) -> Result<bool, DomainError>;
    /// Inserting an existing pair is a no-op.
    async fn insert(&self, subject: Uuid, object: Uuid) -> Result<(), DomainError>;
    /// Returns whether a row was removed.
    async fn remove(&self, subject: Uuid, object: Uuid) -> Result<bool, DomainError>;
    async fn count_by_object(&self, object: Uuid) -> Result<i64, DomainError>;
    async fn count_by_subject(&self, subject: Uuid) -> Result<i64, DomainError>;
    async fn count_by_objects(&self, objects: &[Uuid]) -> Result<HashMap<Uuid, i64>, DomainError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RelationTable {
    pub table: &'static str,
    pub subject_column: &'static str,
    pub object_column: &'static str,
}

pub const LIKES: RelationTable = RelationTable {
    table: "likes",
    subject_column: "user_id",
    object_column: "post_id",
};

pub const FOLLOWS: RelationTable = RelationTable {
    table: "follows",
    subject_column: "follower_id",
    object_column: "following_id",
};

#[derive(Clone)]
pub struct PostgresRelationRepository {
    pool: PgPool,
    table: RelationTable,
}

impl PostgresRelationRepository {
    pub fn new(pool: PgPool, table: RelationTable) -> Self {
        Self { pool, table }
    }
}

#[async_trait]
impl RelationRepository for PostgresRelationRepository {
    async fn exists(&self, subject: Uuid, object: Uuid) -> Result<bool, DomainError> {
        let RelationTable {
            table,
            subject_column,
            object_column,
        } = self.table;
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE {subject_column} = $1 AND {object_column} = $2)"
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(subject)
            .bind(object)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to check {} row: {}", table, e);
                DomainError::from(e)
            })
    }

    async fn insert(&self, subject: Uuid, object: Uuid) -> Result<(), DomainError> {
        let RelationTable {
            table,
            subject_column,
            object_column,
        } = self.table;
        let query = format!(
            "INSERT INTO {table} ({subject_column}, {object_column}) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        );
        sqlx::query(&query)
            .bind(subject)
            .bind(object)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to insert {} row: {}", table, e);
                DomainError::from(e)
            })?;

        info!(table, subject = %subject, object = %object, "relation added");
        Ok(())
    }

    async fn remove(&self, subject: Uuid, object: Uuid) -> Result<bool, DomainError> {
        let RelationTable {
            table,
            subject_column,
            object_column,
        } = self.table;
        let query =
            format!("DELETE FROM {table} WHERE {subject_column} = $1 AND {object_column} = $2");
        let deleted = sqlx::query(&query)
            .bind(subject)
            .bind(object)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete {} row: {}", table, e);
                DomainError::from(e)
            })?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(table, subject = %subject, object = %object, "relation removed");
        }
        Ok(removed)
    }

    async fn count_by_object(&self, object: Uuid) -> Result<i64, DomainError> {
        let RelationTable {
            table,
            object_column,
            ..
        } = self.table;
        let query = format!("SELECT COUNT(*) FROM {table} WHERE {object_column} = $1");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(object)
            .fetch_one(&self.pool)
            .await
            .map_err(DomainError::from)
    }

    async fn count_by_subject(&self, subject: Uuid) -> Result<i64, DomainError> {
        let RelationTable {
            table,
            subject_column,
            ..
        } = self.table;
        let query = format!("SELECT COUNT(*) FROM {table} WHERE {subject_column} = $1");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(subject)
            .fetch_one(&self.pool)
            .await
            .map_err(DomainError::from)
    }

    async fn count_by_objects(&self, objects: &[Uuid]) -> Result<HashMap<Uuid, i64>, DomainError> {
        if objects.is_empty() {
            return Ok(HashMap::new());
        }

        let RelationTable {
            table,
            object_column,
            ..
        } = self.table;
        let query = format!(
            "SELECT {object_column}, COUNT(*) FROM {table} WHERE {object_column} = ANY($1) GROUP BY {object_column}"
        );
        let rows = sqlx::query_as::<_, (Uuid, i64)>(&query)
            .bind(objects.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to count {} rows: {}", table, e);
                DomainError::from(e)
            })?;

        Ok(rows.into_iter().collect())
    }
}
