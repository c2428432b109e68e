use std::fs;
use std::path::PathBuf;

use reqwest::header::{COOKIE, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::error::PublishlyClientError;
use crate::models::{
    AuthResponse, Comment, CommentsResponse, FollowState, LikeState, MeResponse, Post, PostDraft,
    PostsResponse, Profile, SessionUser, TagPage, UserSummary,
};

pub const TOKEN_FILE: &str = ".publishly_token";
const SESSION_COOKIE: &str = "token";

/// HTTP client for the Publishly REST API.
///
/// The session token issued by `login` is kept in memory and persisted to a
/// token file so later invocations can reuse it.
#[derive(Clone)]
pub struct PublishlyClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    token_path: PathBuf,
}

impl PublishlyClient {
    pub fn connect(endpoint: &str) -> Result<Self, PublishlyClientError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token: None,
            token_path: PathBuf::from(TOKEN_FILE),
        })
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: String) -> Result<(), PublishlyClientError> {
        fs::write(&self.token_path, &token)?;
        self.token = Some(token);
        Ok(())
    }

    fn clear_token(&mut self) -> Result<(), PublishlyClientError> {
        self.token = None;
        match fs::remove_file(&self.token_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn stored_token(&self) -> Option<String> {
        match &self.token {
            Some(token) if !token.is_empty() => Some(token.clone()),
            _ => fs::read_to_string(&self.token_path)
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Attaches the session cookie when one is known.
    fn with_session(&self, req: RequestBuilder) -> Result<RequestBuilder, PublishlyClientError> {
        match self.stored_token() {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}"))
                    .map_err(|_| PublishlyClientError::MissingSession)?;
                Ok(req.header(COOKIE, value))
            }
            None => Ok(req),
        }
    }

    /// Like `with_session`, but fails locally when no session exists.
    fn require_session(&self, req: RequestBuilder) -> Result<RequestBuilder, PublishlyClientError> {
        if self.stored_token().is_none() {
            return Err(PublishlyClientError::MissingSession);
        }
        self.with_session(req)
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, PublishlyClientError> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(PublishlyClientError::from_http_response(resp).await)
        }
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSummary, PublishlyClientError> {
        let resp = self
            .client
            .post(self.url("/auth/signup"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        let auth: AuthResponse = Self::read(resp).await?;
        Ok(auth.user)
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<UserSummary, PublishlyClientError> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let token = session_token(&resp);
        let auth: AuthResponse = Self::read(resp).await?;
        let token = token.ok_or_else(|| {
            PublishlyClientError::Unauthorized("login response carried no session".into())
        })?;
        self.set_token(token)?;
        Ok(auth.user)
    }

    pub async fn logout(&mut self) -> Result<(), PublishlyClientError> {
        let req = self.with_session(self.client.post(self.url("/auth/logout")))?;
        let resp = req.send().await?;
        let _: serde_json::Value = Self::read(resp).await?;
        self.clear_token()
    }

    pub async fn me(&self) -> Result<Option<SessionUser>, PublishlyClientError> {
        let req = self.with_session(self.client.get(self.url("/auth/me")))?;
        let me: MeResponse = Self::read(req.send().await?).await?;
        Ok(me.user)
    }

    pub async fn feed(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Post>, PublishlyClientError> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset));
        }
        let resp = self
            .client
            .get(self.url("/posts"))
            .query(&query)
            .send()
            .await?;
        let page: PostsResponse = Self::read(resp).await?;
        Ok(page.posts)
    }

    pub async fn save_post(&self, draft: &PostDraft) -> Result<Post, PublishlyClientError> {
        let req = self.require_session(self.client.post(self.url("/posts")))?;
        Self::read(req.json(draft).send().await?).await
    }

    pub async fn drafts(&self) -> Result<Vec<Post>, PublishlyClientError> {
        let req = self.require_session(self.client.get(self.url("/posts/drafts")))?;
        let page: PostsResponse = Self::read(req.send().await?).await?;
        Ok(page.posts)
    }

    pub async fn get_post(&self, slug: &str) -> Result<Post, PublishlyClientError> {
        let req = self.with_session(self.client.get(self.url(&format!("/posts/{slug}"))))?;
        Self::read(req.send().await?).await
    }

    pub async fn like_status(&self, post_id: Uuid) -> Result<LikeState, PublishlyClientError> {
        let req = self.with_session(self.client.get(self.url(&format!("/posts/{post_id}/like"))))?;
        Self::read(req.send().await?).await
    }

    pub async fn toggle_like(&self, post_id: Uuid) -> Result<LikeState, PublishlyClientError> {
        let req =
            self.require_session(self.client.post(self.url(&format!("/posts/{post_id}/like"))))?;
        Self::read(req.send().await?).await
    }

    pub async fn comments(&self, post_id: Uuid) -> Result<Vec<Comment>, PublishlyClientError> {
        let req =
            self.with_session(self.client.get(self.url(&format!("/posts/{post_id}/comments"))))?;
        let page: CommentsResponse = Self::read(req.send().await?).await?;
        Ok(page.comments)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        content: &str,
    ) -> Result<Comment, PublishlyClientError> {
        let req = self
            .require_session(self.client.post(self.url(&format!("/posts/{post_id}/comments"))))?;
        Self::read(req.json(&json!({ "content": content })).send().await?).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Post>, PublishlyClientError> {
        let resp = self
            .client
            .get(self.url("/search"))
            .query(&[("q", query)])
            .send()
            .await?;
        let page: PostsResponse = Self::read(resp).await?;
        Ok(page.posts)
    }

    pub async fn tag(&self, slug: &str) -> Result<TagPage, PublishlyClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/tags/{slug}")))
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Profile, PublishlyClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/profiles/{user_id}")))
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn follow_status(&self, user_id: Uuid) -> Result<FollowState, PublishlyClientError> {
        let req =
            self.with_session(self.client.get(self.url(&format!("/profiles/{user_id}/follow"))))?;
        Self::read(req.send().await?).await
    }

    pub async fn toggle_follow(&self, user_id: Uuid) -> Result<FollowState, PublishlyClientError> {
        let req = self
            .require_session(self.client.post(self.url(&format!("/profiles/{user_id}/follow"))))?;
        Self::read(req.send().await?).await
    }
}

/// Session token set by a response, if any.
fn session_token(resp: &Response) -> Option<String> {
    resp.cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
