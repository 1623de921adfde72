//! Configuration schema definitions.
//!
//! ```toml
//! [channel]
//! channel_secret = "..."
//! channel_access_token = "..."
//!
//! [server]
//! port = 8080
//! path = "/callback"
//!
//! [logging]
//! level = "debug"
//! format = "pretty"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lynx_transport::LineClientConfig;
use lynx_transport::http::{DEFAULT_API_ENDPOINT, DEFAULT_DATA_ENDPOINT, DEFAULT_WEBHOOK_PATH};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LynxConfig {
    pub channel: ChannelConfig,
    pub server: ServerConfig,
    pub messages: MessagesConfig,
    pub logging: LoggingConfig,
}

/// Messaging API channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Secret used to verify webhook signatures.
    pub channel_secret: String,

    /// Bearer token for API calls.
    pub channel_access_token: String,

    pub api_endpoint: String,

    /// Endpoint serving message content.
    pub data_endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel_secret: String::new(),
            channel_access_token: String::new(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            data_endpoint: DEFAULT_DATA_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ChannelConfig {
    /// Converts to the API client configuration.
    pub fn to_client_config(&self) -> LineClientConfig {
        LineClientConfig::new(&self.channel_secret, &self.channel_access_token)
            .with_api_endpoint(&self.api_endpoint)
            .with_data_endpoint(&self.data_endpoint)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Webhook server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Path of the webhook endpoint.
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            path: DEFAULT_WEBHOOK_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Messages one reply may carry.
    pub max_per_reply: usize,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self { max_per_reply: 5 }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    pub span_events: SpanEventConfig,

    /// Include thread IDs in log lines.
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    pub file_location: bool,

    /// Log file, used when `output` is `file`; defaults to `lynx.log` in the
    /// working directory.
    pub file_path: Option<PathBuf>,

    /// Per-module levels, e.g. `lynx_framework = "trace"`.
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            filters: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LynxConfig::default();

        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.server.path, "/callback");
        assert_eq!(config.messages.max_per_reply, 5);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_client_config_conversion() {
        let channel = ChannelConfig {
            channel_secret: "secret".into(),
            channel_access_token: "token".into(),
            timeout_secs: 5,
            ..Default::default()
        };
        let client = channel.to_client_config();

        assert_eq!(client.channel_secret, "secret");
        assert_eq!(client.api_endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
