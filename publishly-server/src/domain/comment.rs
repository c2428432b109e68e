use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::user::Author;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<Author>,
}

impl CommentView {
    pub fn new(comment: Comment, author: Option<Author>) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            content: comment.content,
            created_at: comment.created_at,
            author,
        }
    }
}
