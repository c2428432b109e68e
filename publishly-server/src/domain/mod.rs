pub mod comment;
pub mod error;
pub mod post;
pub mod slug;
pub mod tag;
pub mod user;
