use std::sync::Arc;

use uuid::Uuid;

use crate::application::post_service::PostService;
use crate::data::Repositories;
use crate::data::relation_repository::RelationRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::Profile;

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn RelationRepository>,
    posts: PostService,
}

impl ProfileService {
    pub fn new(repos: &Repositories, posts: PostService) -> Self {
        Self {
            users: repos.users.clone(),
            follows: repos.follows.clone(),
            posts,
        }
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Profile, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        Ok(Profile {
            id: user.id,
            name: user.name,
            avatar: user.avatar,
            bio: user.bio,
            follower_count: self.follows.count_by_object(user_id).await?,
            following_count: self.follows.count_by_subject(user_id).await?,
            posts: self.posts.posts_by_author(user_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory;
    use crate::domain::post::PostDraft;
    use crate::domain::user::User;

    #[tokio::test]
    async fn profile_lists_published_posts_and_follow_counts() {
        let repos = memory::repositories();
        let posts = PostService::new(&repos);
        let profiles = ProfileService::new(&repos, posts.clone());

        let ada = repos
            .users
            .create(User::new("Ada".into(), "ada@example.com".into(), "h".into()))
            .await
            .unwrap();
        let bob = repos
            .users
            .create(User::new("Bob".into(), "bob@example.com".into(), "h".into()))
            .await
            .unwrap();
        repos.follows.insert(bob.id, ada.id).await.unwrap();

        for (title, publish) in [("Public", true), ("Private", false)] {
            let draft = PostDraft {
                title: title.into(),
                content: "text".into(),
                excerpt: None,
                cover_image: None,
                tags: vec![],
                publish,
            };
            posts.save_post(ada.id, draft).await.unwrap();
        }

        let profile = profiles.profile(ada.id).await.unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.follower_count, 1);
        assert_eq!(profile.following_count, 0);
        assert_eq!(profile.posts.len(), 1);
        assert_eq!(profile.posts[0].post.title, "Public");
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let repos = memory::repositories();
        let profiles = ProfileService::new(&repos, PostService::new(&repos));
        assert!(matches!(
            profiles.profile(Uuid::new_v4()).await.unwrap_err(),
            DomainError::UserNotFound(_)
        ));
    }
}
