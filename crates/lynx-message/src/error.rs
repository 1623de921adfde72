//! Error types for message construction.

use thiserror::Error;

/// Why a builder refused to produce a message.
///
/// Builders check their rules in a fixed order and report the first one
/// violated; the builder itself is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A mandatory field is empty.
    #[error("missing required parameter: {field}")]
    MissingParameter { field: &'static str },

    /// A URL failed to parse or uses a disallowed scheme.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A text field exceeds its character limit.
    #[error("{field} is too long: {actual} characters (max {limit})")]
    TextTooLong {
        field: &'static str,
        limit: usize,
        actual: usize,
    },

    #[error("too many actions: {actual} (max {limit})")]
    TooManyActions { limit: usize, actual: usize },

    #[error("too many columns: {actual} (max {limit})")]
    TooManyColumns { limit: usize, actual: usize },

    /// Carousel columns must all carry the same number of actions.
    #[error("column {column} has {actual} actions, expected {expected}")]
    ActionCountInconsistent {
        column: usize,
        expected: usize,
        actual: usize,
    },

    #[error("image map has no actions")]
    NoAction,

    /// The base image or an action area has a zero dimension.
    #[error("invalid image map size: {width}x{height}")]
    InvalidMapSize { width: u32, height: u32 },

    #[error("message bank is full ({limit} messages)")]
    TooManyMessages { limit: usize },

    #[error("no column template configured")]
    NoColumnTemplate,

    /// A column template could not be rendered against a record.
    #[error("failed to render {field}: {reason}")]
    Render { field: &'static str, reason: String },
}

impl BuildError {
    /// Creates a missing parameter error.
    pub fn missing(field: &'static str) -> Self {
        Self::MissingParameter { field }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a render error.
    pub fn render(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Render {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for message construction.
pub type BuildResult<T> = Result<T, BuildError>;
