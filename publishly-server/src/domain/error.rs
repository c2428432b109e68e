use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("post not found: {0}")]
    PostNotFound(String),
    #[error("tag not found: {0}")]
    TagNotFound(String),
    #[error("slug already taken: {0}")]
    SlugTaken(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Internal(format!("database error: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::TagNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthorized | DomainError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            DomainError::UserAlreadyExists(_) | DomainError::SlugTaken(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            DomainError::Internal(detail) => {
                error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let details = match self {
            DomainError::UserNotFound(id) => Some(json!({ "resource": id })),
            DomainError::PostNotFound(resource) | DomainError::TagNotFound(resource) => {
                Some(json!({ "resource": resource }))
            }
            DomainError::SlugTaken(slug) => Some(json!({
                "slug": slug,
                "message": "another author already published under this title",
            })),
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
