use crate::domain::error::DomainError;
use crate::domain::tag::Tag;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Returns the tag stored under `tag.slug`, inserting `tag` if there is none.
    async fn find_or_create(&self, tag: Tag) -> Result<Tag, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError>;
    /// Drops every association of `post_id` and links exactly `tag_ids`.
    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), DomainError>;
    async fn tags_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<(Uuid, Tag)>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: Uuid,
    id: Uuid,
    name: String,
    slug: String,
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_or_create(&self, tag: Tag) -> Result<Tag, DomainError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
            RETURNING id, name, slug
            "#,
        )
        .bind(tag.id)
        .bind(&tag.name)
        .bind(&tag.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to resolve tag {}: {}", tag.slug, e);
            DomainError::from(e)
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to find tag {}: {}", slug, e);
                DomainError::from(e)
            })
    }

    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query(
                "INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(|e| {
            error!("failed to replace tags of post {}: {}", post_id, e);
            DomainError::from(e)
        })?;

        info!(post_id = %post_id, tags = tag_ids.len(), "post tags replaced");
        Ok(())
    }

    async fn tags_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<(Uuid, Tag)>, DomainError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id, t.name, t.slug
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(post_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to load post tags: {}", e);
            DomainError::from(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.post_id,
                    Tag {
                        id: row.id,
                        name: row.name,
                        slug: row.slug,
                    },
                )
            })
            .collect())
    }
}
