use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::user::User;
use crate::presentation::middleware::RequestId;

pub const SESSION_COOKIE: &str = "token";

/// The caller resolved from the session token by `JwtAuthMiddleware`.
///
/// Extracting it directly rejects anonymous requests with 401; extract
/// `Option<AuthenticatedUser>` on routes where a session is optional.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = DomainError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(DomainError::Unauthorized)),
        }
    }
}

/// Builds the HttpOnly cookie that carries the session token.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    secure: bool,
    max_age_secs: i64,
}

impl SessionCookie {
    pub fn new(secure: bool, ttl: chrono::Duration) -> Self {
        Self {
            secure,
            max_age_secs: ttl.num_seconds(),
        }
    }

    pub fn issue(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .max_age(CookieDuration::seconds(self.max_age_secs))
            .finish()
    }

    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .finish();
        cookie.make_removal();
        cookie
    }
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
