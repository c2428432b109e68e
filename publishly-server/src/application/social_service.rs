use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::toggle::{Toggled, toggle};
use crate::data::Repositories;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::relation_repository::RelationRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;
use crate::domain::user::Author;

#[derive(Debug, Clone, Serialize)]
pub struct LikeState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
    pub following: bool,
    pub follower_count: i64,
    pub following_count: i64,
}

/// Likes, follows and comments.
#[derive(Clone)]
pub struct SocialService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    likes: Arc<dyn RelationRepository>,
    follows: Arc<dyn RelationRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl SocialService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            posts: repos.posts.clone(),
            users: repos.users.clone(),
            likes: repos.likes.clone(),
            follows: repos.follows.clone(),
            comments: repos.comments.clone(),
        }
    }

    /// Drafts exist only for their author; everyone else gets a 404.
    async fn ensure_visible_post(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<(), DomainError> {
        match self.posts.find_by_id(post_id).await? {
            Some(post) if post.published || viewer == Some(post.author_id) => Ok(()),
            _ => Err(DomainError::PostNotFound(post_id.to_string())),
        }
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<Author, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.author())
            .ok_or(DomainError::UserNotFound(user_id))
    }

    #[instrument(skip(self))]
    pub async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeState, DomainError> {
        self.ensure_visible_post(post_id, Some(user_id)).await?;

        let outcome = toggle(self.likes.as_ref(), user_id, post_id).await?;
        let like_count = self.likes.count_by_object(post_id).await?;
        let (action, liked) = match outcome {
            Toggled::Added => ("liked", true),
            Toggled::Removed => ("unliked", false),
        };

        info!(user_id = %user_id, post_id = %post_id, action, like_count, "like toggled");
        Ok(LikeState {
            action: Some(action),
            liked,
            like_count,
        })
    }

    pub async fn like_status(
        &self,
        viewer: Option<Uuid>,
        post_id: Uuid,
    ) -> Result<LikeState, DomainError> {
        self.ensure_visible_post(post_id, viewer).await?;

        let liked = match viewer {
            Some(user_id) => self.likes.exists(user_id, post_id).await?,
            None => false,
        };
        Ok(LikeState {
            action: None,
            liked,
            like_count: self.likes.count_by_object(post_id).await?,
        })
    }

    #[instrument(skip(self))]
    pub async fn toggle_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<FollowState, DomainError> {
        if follower_id == following_id {
            return Err(DomainError::Validation("you cannot follow yourself".into()));
        }
        self.ensure_user(following_id).await?;

        let outcome = toggle(self.follows.as_ref(), follower_id, following_id).await?;
        let (action, following) = match outcome {
            Toggled::Added => ("followed", true),
            Toggled::Removed => ("unfollowed", false),
        };

        info!(follower_id = %follower_id, following_id = %following_id, action, "follow toggled");
        Ok(FollowState {
            action: Some(action),
            following,
            follower_count: self.follows.count_by_object(following_id).await?,
            following_count: self.follows.count_by_subject(following_id).await?,
        })
    }

    pub async fn follow_status(
        &self,
        viewer: Option<Uuid>,
        user_id: Uuid,
    ) -> Result<FollowState, DomainError> {
        self.ensure_user(user_id).await?;

        let following = match viewer {
            Some(viewer) if viewer != user_id => self.follows.exists(viewer, user_id).await?,
            _ => false,
        };
        Ok(FollowState {
            action: None,
            following,
            follower_count: self.follows.count_by_object(user_id).await?,
            following_count: self.follows.count_by_subject(user_id).await?,
        })
    }

    #[instrument(skip(self, content))]
    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<CommentView, DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Validation("comment cannot be empty".into()));
        }
        self.ensure_visible_post(post_id, Some(author_id)).await?;
        let author = self.ensure_user(author_id).await?;

        let comment = self
            .comments
            .create(Comment::new(post_id, author_id, content.to_string()))
            .await?;
        Ok(CommentView::new(comment, Some(author)))
    }

    pub async fn list_comments(
        &self,
        viewer: Option<Uuid>,
        post_id: Uuid,
    ) -> Result<Vec<CommentView>, DomainError> {
        self.ensure_visible_post(post_id, viewer).await?;

        let comments = self.comments.list_for_post(post_id).await?;
        let mut author_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
        author_ids.sort();
        author_ids.dedup();
        let authors = self.users.find_authors(&author_ids).await?;

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = authors.iter().find(|a| a.id == comment.author_id).cloned();
                CommentView::new(comment, author)
            })
            .collect())
    }
}
