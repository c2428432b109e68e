pub mod auth_service;
pub mod post_service;
pub mod profile_service;
pub mod social_service;
pub mod toggle;

use crate::data::Repositories;
use crate::infrastructure::security::JwtKeys;
use auth_service::AuthService;
use post_service::PostService;
use profile_service::ProfileService;
use social_service::SocialService;

#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub posts: PostService,
    pub social: SocialService,
    pub profiles: ProfileService,
}

impl Services {
    pub fn new(repos: Repositories, keys: JwtKeys) -> Self {
        let posts = PostService::new(&repos);
        Self {
            auth: AuthService::new(repos.users.clone(), keys),
            social: SocialService::new(&repos),
            profiles: ProfileService::new(&repos, posts.clone()),
            posts,
        }
    }
}
