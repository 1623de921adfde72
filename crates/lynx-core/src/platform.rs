//! The platform capability consumed by the framework.
//!
//! The router never talks HTTP itself. Everything it needs from the
//! messaging platform goes through [`Platform`], which keeps dispatch logic
//! testable with an in-memory double and lets the HTTP client live in its own
//! crate.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ApiResult, WebhookResult};
use crate::event::Event;
use crate::message::Message;

/// Profile information of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// Operations the framework needs from the messaging platform.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Verifies `signature` against `body` and decodes the events it carries.
    fn parse_webhook(&self, body: &[u8], signature: &str) -> WebhookResult<Vec<Event>>;

    /// Downloads the binary content of an image, video or audio message.
    async fn fetch_content(&self, message_id: &str) -> ApiResult<Vec<u8>>;

    /// Looks up a user's profile.
    async fn fetch_profile(&self, user_id: &str) -> ApiResult<UserProfile>;

    /// Sends `messages` as the reply to the event that issued `reply_token`.
    async fn reply(&self, reply_token: &str, messages: &[Message]) -> ApiResult<()>;

    /// Sends `messages` to a user, group or room.
    async fn push(&self, to: &str, messages: &[Message]) -> ApiResult<()>;
}

/// A shared platform handle.
pub type BoxedPlatform = Arc<dyn Platform>;
