use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub author_id: Uuid,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Option<Author>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub like_count: i64,
    pub comment_count: i64,
    pub read_time: u32,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let author = self
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or("unknown");
        let state = if self.published { "published" } else { "draft" };
        writeln!(f, "{} [{}] ({state})", self.title, self.slug)?;
        writeln!(
            f,
            "  by {author} | {} min read | {} likes | {} comments",
            self.read_time, self.like_count, self.comment_count
        )?;
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(|t| t.name.as_str()).collect();
            writeln!(f, "  tags: {}", tags.join(", "))?;
        }
        write!(f, "  {}", self.excerpt)
    }
}

/// Editor state sent to `POST /api/posts`.
#[derive(Debug, Clone, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub publish: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeState {
    pub action: Option<String>,
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowState {
    pub action: Option<String>,
    pub following: bool,
    pub follower_count: i64,
    pub following_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
    pub posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub user: UserSummary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    pub user: Option<SessionUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostsResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentsResponse {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagPage {
    pub tag: Tag,
    pub posts: Vec<Post>,
}
