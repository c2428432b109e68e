use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishlyClientError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token file error: {0}")]
    TokenFile(#[from] std::io::Error),
    #[error("not logged in")]
    MissingSession,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

impl PublishlyClientError {
    /// Maps a non-2xx response onto an error variant, keeping the server's
    /// `error` message when the body carries one.
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Self::from_status(status, &text)
    }

    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                error,
                details: Some(details),
            }) => format!("{error} ({details})"),
            Ok(ErrorBody { error, .. }) => error,
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => body.trim().to_string(),
        };

        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(message),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}
