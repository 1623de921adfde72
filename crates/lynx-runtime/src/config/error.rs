//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why a configuration could not be loaded or was rejected.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file extension names no enabled format.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A source could not be read or did not fit the schema.
    #[error("failed to load configuration: {0}")]
    Extract(#[source] Box<figment::Error>),

    /// The channel secret or access token is empty.
    #[error("channel credential `{0}` is not set")]
    MissingCredential(&'static str),

    #[error("endpoint `{field}` ({url}) is invalid: {reason}")]
    InvalidEndpoint {
        field: &'static str,
        url: String,
        reason: String,
    },

    /// A value is outside the range the bot can work with.
    #[error("invalid `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid_endpoint(
        field: &'static str,
        url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEndpoint {
            field,
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
