mod error;
mod http_client;
mod models;

pub use error::PublishlyClientError;
pub use http_client::{PublishlyClient, TOKEN_FILE};
pub use models::{
    Author, Comment, FollowState, LikeState, Post, PostDraft, Profile, SessionUser, Tag, TagPage,
    UserSummary,
};
