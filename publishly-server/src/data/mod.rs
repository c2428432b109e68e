pub mod comment_repository;
#[cfg(test)]
pub mod memory;
pub mod post_repository;
pub mod relation_repository;
pub mod tag_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use comment_repository::{CommentRepository, PostgresCommentRepository};
use post_repository::{PostRepository, PostgresPostRepository};
use relation_repository::{FOLLOWS, LIKES, PostgresRelationRepository, RelationRepository};
use tag_repository::{PostgresTagRepository, TagRepository};
use user_repository::{PostgresUserRepository, UserRepository};

/// Every table the services talk to, behind its repository trait.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn RelationRepository>,
    pub follows: Arc<dyn RelationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            tags: Arc::new(PostgresTagRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            likes: Arc::new(PostgresRelationRepository::new(pool.clone(), LIKES)),
            follows: Arc::new(PostgresRelationRepository::new(pool, FOLLOWS)),
        }
    }
}
