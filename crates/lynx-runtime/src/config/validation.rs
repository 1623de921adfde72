//! Checks run on a loaded configuration before the runtime starts.

use lynx_message::validate::MAX_MESSAGES_PER_REPLY;
use url::Url;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ChannelConfig, LynxConfig, MessagesConfig, ServerConfig};

/// Rejects configurations the runtime cannot start with.
pub fn validate_config(config: &LynxConfig) -> ConfigResult<()> {
    validate_channel(&config.channel)?;
    validate_server(&config.server)?;
    validate_messages(&config.messages)
}

fn validate_channel(channel: &ChannelConfig) -> ConfigResult<()> {
    if channel.channel_secret.is_empty() {
        return Err(ConfigError::MissingCredential("channel.channel_secret"));
    }
    if channel.channel_access_token.is_empty() {
        return Err(ConfigError::MissingCredential("channel.channel_access_token"));
    }

    check_endpoint("channel.api_endpoint", &channel.api_endpoint)?;
    check_endpoint("channel.data_endpoint", &channel.data_endpoint)?;

    if channel.timeout_secs == 0 {
        return Err(ConfigError::invalid_value(
            "channel.timeout_secs",
            "must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> ConfigResult<()> {
    if server.host.is_empty() {
        return Err(ConfigError::invalid_value("server.host", "must not be empty"));
    }
    if server.port == 0 {
        return Err(ConfigError::invalid_value("server.port", "must not be 0"));
    }
    if !server.path.starts_with('/') {
        return Err(ConfigError::invalid_value(
            "server.path",
            format!("{:?} must start with '/'", server.path),
        ));
    }
    Ok(())
}

fn validate_messages(messages: &MessagesConfig) -> ConfigResult<()> {
    if messages.max_per_reply == 0 || messages.max_per_reply > MAX_MESSAGES_PER_REPLY {
        return Err(ConfigError::invalid_value(
            "messages.max_per_reply",
            format!("must be between 1 and {MAX_MESSAGES_PER_REPLY}"),
        ));
    }
    Ok(())
}

/// Endpoints must be absolute http(s) URLs.
fn check_endpoint(field: &'static str, url: &str) -> ConfigResult<()> {
    let parsed =
        Url::parse(url).map_err(|e| ConfigError::invalid_endpoint(field, url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::invalid_endpoint(
            field,
            url,
            format!("unsupported scheme {scheme:?}"),
        )),
    }
}
