//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while starting or running the bot.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The API client could not be created.
    #[error("Failed to create API client: {0}")]
    Client(#[from] lynx_core::ApiError),

    /// Binding or serving the webhook endpoint failed.
    #[error("Webhook server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
