//! Error types for the Lynx framework.

use lynx_core::ApiError;
use lynx_message::BuildError;
use thiserror::Error;

/// Errors raised while handling an event.
///
/// Any of these stops the handler chain and is passed to every registered
/// error handler.
#[derive(Debug, Error)]
pub enum BotError {
    /// A join or leave event came from a source that cannot be joined.
    #[error("unsupported source for {event} event: {kind}")]
    UnsupportedJoinSource {
        event: &'static str,
        kind: &'static str,
    },

    #[error("failed to fetch message content: {0}")]
    ContentFetch(#[source] ApiError),

    #[error("failed to fetch user profile: {0}")]
    ProfileFetch(#[source] ApiError),

    #[error("failed to deliver messages: {0}")]
    Delivery(#[source] ApiError),

    /// A profile was requested for an event without a user.
    #[error("event carries no user ID")]
    MissingUserId,

    /// Messages were queued for an event that cannot be replied to.
    #[error("messages are pending but the event has no reply token")]
    MissingReplyToken,

    #[error(transparent)]
    Build(#[from] BuildError),

    /// Failure raised by application code.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl BotError {
    /// Creates a handler error from a message.
    pub fn custom<M>(message: M) -> Self
    where
        M: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        Self::Handler(anyhow::Error::msg(message))
    }
}

/// Errors raised while compiling a text pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid text pattern {pattern:?}: {source}")]
    Invalid {
        pattern: String,
        source: regex::Error,
    },
}
