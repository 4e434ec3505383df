use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

pub const INVALID_CHANNEL_MESSAGE: &str = "Please provide a valid channel ID";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Invalid channel: {message}")]
    InvalidChannel { message: String },

    /// Fetch failure of a [`MessageSource`](crate::services::MessageSource)
    /// backed by a remote service. The in-memory `ChannelStore` never fails.
    #[error("Message source failed: {message}")]
    Upstream { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FeedError {
    pub fn invalid_channel(message: impl Into<String>) -> Self {
        Self::InvalidChannel {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            FeedError::InvalidChannel { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type FeedResult<T> = Result<T, FeedError>;

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
}

impl UserFriendlyError for FeedError {
    fn user_message(&self) -> String {
        match self {
            FeedError::InvalidChannel { message } => message.clone(),
            FeedError::Upstream { .. }
            | FeedError::Io(_)
            | FeedError::Config { .. }
            | FeedError::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.user_message() });
        (self.status_code(), Json(body)).into_response()
    }
}
