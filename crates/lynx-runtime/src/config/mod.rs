//! Configuration module for the Lynx runtime.
//!
//! Layered loading (defaults, files, environment) and validation of the
//! channel credentials, webhook server and logging settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    ChannelConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, LynxConfig, MessagesConfig,
    ServerConfig, SpanEventConfig,
};
pub use validation::validate_config;
