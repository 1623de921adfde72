//! In-memory [`Platform`] double.
//!
//! Records every reply and push it receives and serves canned content and
//! profiles, so dispatch and delivery can be asserted without a network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{ApiError, ApiResult, WebhookError, WebhookResult};
use crate::event::{Event, parse_payload};
use crate::message::Message;
use crate::platform::{Platform, UserProfile};

/// A recorded delivery: target (reply token or push recipient) and messages.
pub type Delivery = (String, Vec<Message>);

#[derive(Default)]
pub struct MockPlatform {
    signature: Option<String>,
    contents: HashMap<String, Vec<u8>>,
    profiles: HashMap<String, UserProfile>,
    failing_targets: HashSet<String>,
    fail_replies: AtomicBool,
    replies: Mutex<Vec<Delivery>>,
    pushes: Mutex<Vec<Delivery>>,
    content_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only this exact signature is accepted by `parse_webhook`.
    /// Without it every signature passes.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_content(mut self, message_id: impl Into<String>, content: Vec<u8>) -> Self {
        self.contents.insert(message_id.into(), content);
        self
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profiles.insert(profile.user_id.clone(), profile);
        self
    }

    /// Pushes to `target` fail with a 400 status.
    pub fn failing_push_to(mut self, target: impl Into<String>) -> Self {
        self.failing_targets.insert(target.into());
        self
    }

    /// Every reply fails with a 400 status.
    pub fn failing_replies(self) -> Self {
        self.fail_replies.store(true, Ordering::SeqCst);
        self
    }

    pub fn replies(&self) -> Vec<Delivery> {
        self.replies.lock().clone()
    }

    pub fn pushes(&self) -> Vec<Delivery> {
        self.pushes.lock().clone()
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn parse_webhook(&self, body: &[u8], signature: &str) -> WebhookResult<Vec<Event>> {
        if let Some(expected) = &self.signature
            && expected != signature
        {
            return Err(WebhookError::InvalidSignature);
        }
        parse_payload(body)
    }

    async fn fetch_content(&self, message_id: &str) -> ApiResult<Vec<u8>> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        self.contents
            .get(message_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, format!("no content for {message_id}")))
    }

    async fn fetch_profile(&self, user_id: &str) -> ApiResult<UserProfile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, format!("no profile for {user_id}")))
    }

    async fn reply(&self, reply_token: &str, messages: &[Message]) -> ApiResult<()> {
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(ApiError::status(400, "Invalid reply token"));
        }
        self.replies
            .lock()
            .push((reply_token.to_string(), messages.to_vec()));
        Ok(())
    }

    async fn push(&self, to: &str, messages: &[Message]) -> ApiResult<()> {
        if self.failing_targets.contains(to) {
            return Err(ApiError::status(400, format!("cannot push to {to}")));
        }
        self.pushes.lock().push((to.to_string(), messages.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_deliveries() {
        let platform = MockPlatform::new().failing_push_to("Ubad");

        platform
            .reply("token", &[Message::text("hi")])
            .await
            .unwrap();
        platform.push("Ugood", &[Message::text("a")]).await.unwrap();
        assert!(platform.push("Ubad", &[Message::text("b")]).await.is_err());

        assert_eq!(platform.replies().len(), 1);
        assert_eq!(platform.pushes(), vec![("Ugood".into(), vec![Message::text("a")])]);
    }

    #[test]
    fn test_mock_signature_check() {
        let platform = MockPlatform::new().with_signature("sig");
        let body = br#"{"events":[]}"#;
        assert!(platform.parse_webhook(body, "sig").unwrap().is_empty());
        assert!(matches!(
            platform.parse_webhook(body, "nope"),
            Err(WebhookError::InvalidSignature)
        ));
    }
}
