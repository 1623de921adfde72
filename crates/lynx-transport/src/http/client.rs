//! LINE Messaging API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use lynx_core::{
    ApiError, ApiResult, Event, Message, Platform, UserProfile, WebhookResult, parse_payload,
};

use crate::signature;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.line.me";
pub const DEFAULT_DATA_ENDPOINT: &str = "https://api-data.line.me";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and endpoints of one channel.
#[derive(Debug, Clone)]
pub struct LineClientConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
    pub api_endpoint: String,
    pub data_endpoint: String,
    pub timeout: Duration,
}

impl LineClientConfig {
    pub fn new(channel_secret: impl Into<String>, channel_access_token: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            channel_access_token: channel_access_token.into(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            data_endpoint: DEFAULT_DATA_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = endpoint.into();
        self
    }

    pub fn with_data_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.data_endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [Message],
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// [`Platform`] backed by the LINE Messaging API.
#[derive(Debug, Clone)]
pub struct LineClient {
    client: Client,
    config: LineClientConfig,
}

impl LineClient {
    pub fn new(config: LineClientConfig) -> ApiResult<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LineClientConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_endpoint.trim_end_matches('/'), path)
    }

    fn data_url(&self, path: &str) -> String {
        format!("{}{}", self.config.data_endpoint.trim_end_matches('/'), path)
    }

    /// Sends an authorized request and turns non-2xx answers into errors.
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .bearer_auth(&self.config.channel_access_token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        warn!(status = status.as_u16(), message = %message, "LINE API request failed");
        Err(ApiError::status(status.as_u16(), message))
    }

    async fn post_json<T: Serialize + ?Sized>(&self, url: String, body: &T) -> ApiResult<()> {
        trace!(url = %url, "POST");
        self.send(self.client.post(url).json(body)).await?;
        Ok(())
    }

    async fn get_bytes(&self, url: String) -> ApiResult<Vec<u8>> {
        trace!(url = %url, "GET");
        let response = self.send(self.client.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Platform for LineClient {
    fn parse_webhook(&self, body: &[u8], signature: &str) -> WebhookResult<Vec<Event>> {
        signature::verify(&self.config.channel_secret, body, signature)?;
        parse_payload(body)
    }

    async fn fetch_content(&self, message_id: &str) -> ApiResult<Vec<u8>> {
        debug!(message_id = %message_id, "Fetching message content");
        self.get_bytes(self.data_url(&format!("/v2/bot/message/{message_id}/content")))
            .await
    }

    async fn fetch_profile(&self, user_id: &str) -> ApiResult<UserProfile> {
        let body = self
            .get_bytes(self.api_url(&format!("/v2/bot/profile/{user_id}")))
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn reply(&self, reply_token: &str, messages: &[Message]) -> ApiResult<()> {
        debug!(count = messages.len(), "Sending reply");
        self.post_json(
            self.api_url("/v2/bot/message/reply"),
            &ReplyRequest {
                reply_token,
                messages,
            },
        )
        .await
    }

    async fn push(&self, to: &str, messages: &[Message]) -> ApiResult<()> {
        debug!(to = %to, count = messages.len(), "Pushing messages");
        self.post_json(
            self.api_url("/v2/bot/message/push"),
            &PushRequest { to, messages },
        )
        .await
    }
}
