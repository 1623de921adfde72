//! Error types shared by every Lynx crate.

use thiserror::Error;

/// Errors raised while turning a raw webhook request into events.
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    /// The request signature does not match the body.
    #[error("invalid webhook signature")]
    InvalidSignature,
    /// The body is not a valid webhook payload.
    #[error("failed to parse webhook payload: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors returned by platform API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The platform answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },
    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Creates a status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for webhook parsing.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
