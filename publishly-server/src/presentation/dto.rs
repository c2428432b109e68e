use crate::domain::post::PostDetails;
use crate::domain::tag::Tag;
use crate::domain::user::User;
use crate::presentation::utils::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<AuthenticatedUser> for SessionUser {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<SessionUser>,
}

// ======================= POSTS =======================

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListPostsResponse {
    pub posts: Vec<PostDetails>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<PostDetails>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub posts: Vec<PostDetails>,
}

#[derive(Debug, Serialize)]
pub struct TagPostsResponse {
    pub tag: Tag,
    pub posts: Vec<PostDetails>,
}

// ======================= COMMENTS =======================

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

// ======================= Utils =======================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}
