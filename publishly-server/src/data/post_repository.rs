use crate::domain::error::DomainError;
use crate::domain::post::Post;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

const POST_COLUMNS: &str = "id, slug, title, content, excerpt, cover_image, author_id, \
                            published, published_at, created_at, updated_at";

/// Selection of posts for feeds, search, tag pages, profiles and draft lists.
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub published: bool,
    pub author_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            published: true,
            author_id: None,
            tag_id: None,
            search: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }

    pub fn drafts_of(author_id: Uuid) -> Self {
        Self {
            published: false,
            author_id: Some(author_id),
            limit: MAX_PAGE_SIZE,
            ..Self::published()
        }
    }

    pub fn page(mut self, limit: Option<i64>, offset: Option<i64>) -> Self {
        self.limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        self.offset = offset.unwrap_or(0).max(0);
        self
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn update(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError>;
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes `ILIKE` wildcards so the term is matched literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, slug, title, content, excerpt, cover_image, author_id,
                               published, published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.cover_image)
        .bind(post.author_id)
        .bind(post.published)
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            if e.as_database_error()
                .and_then(|db| db.constraint())
                .map(|c| c.contains("posts_slug"))
                == Some(true)
            {
                DomainError::SlugTaken(post.slug.clone())
            } else {
                DomainError::from(e)
            }
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, slug = %post.slug, "post created");
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, DomainError> {
        let query = format!(
            r#"
            UPDATE posts
            SET
                title = $1,
                content = $2,
                excerpt = $3,
                cover_image = $4,
                published = $5,
                published_at = $6,
                updated_at = $7
            WHERE id = $8
            RETURNING {POST_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Post>(&query)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.excerpt)
            .bind(&post.cover_image)
            .bind(post.published)
            .bind(post.published_at)
            .bind(post.updated_at)
            .bind(post.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to update post {}: {}", post.id, e);
                DomainError::from(e)
            })?
            .ok_or_else(|| DomainError::PostNotFound(post.id.to_string()))?;

        info!(post_id = %updated.id, published = updated.published, "post updated");
        Ok(updated)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_id {}: {}", id, e);
                DomainError::from(e)
            })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_by_slug {}: {}", slug, e);
                DomainError::from(e)
            })
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        let order = if filter.published {
            "published_at DESC NULLS LAST, created_at DESC"
        } else {
            "updated_at DESC"
        };
        let query = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE published = $1
              AND ($2::uuid IS NULL OR author_id = $2)
              AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM post_tags pt
                    WHERE pt.post_id = posts.id AND pt.tag_id = $3))
              AND ($4::text IS NULL
                   OR title ILIKE $4 OR content ILIKE $4 OR excerpt ILIKE $4)
            ORDER BY {order}
            LIMIT $5 OFFSET $6
            "#
        );

        sqlx::query_as::<_, Post>(&query)
            .bind(filter.published)
            .bind(filter.author_id)
            .bind(filter.tag_id)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while listing posts: {}", e);
                DomainError::from(e)
            })
    }
}
