//! Per-event context.
//!
//! One [`BotContext`] is created for every dispatched event and shared, behind
//! an `Arc`, by all handlers of the chain. It carries:
//!
//! - the event and the platform handle
//! - the parameters captured by the last successful text pattern match
//! - a string-keyed scratch map for passing values between handlers
//! - the [`MessageBank`] flushed as the reply once the chain ends
//! - the sender's profile, fetched on first use and cached

use std::any::Any;
use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use lynx_core::{BoxedPlatform, Event, Message, UserProfile};
use lynx_message::{BuildResult, MessageBank};

use crate::error::BotError;

pub struct BotContext {
    event: Event,
    platform: BoxedPlatform,
    params: Mutex<HashMap<String, String>>,
    data: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
    messages: Mutex<MessageBank>,
    profile: OnceCell<UserProfile>,
}

impl BotContext {
    /// Creates a context whose bank holds at most `capacity` messages.
    pub fn new(event: Event, platform: BoxedPlatform, capacity: usize) -> Self {
        Self {
            event,
            platform,
            params: Mutex::new(HashMap::new()),
            data: Mutex::new(HashMap::new()),
            messages: Mutex::new(MessageBank::with_capacity(capacity)),
            profile: OnceCell::new(),
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn platform(&self) -> &BoxedPlatform {
        &self.platform
    }

    // =========================================================================
    // Pattern parameters
    // =========================================================================

    /// A parameter captured by the last matching text pattern.
    pub fn param(&self, name: &str) -> Option<String> {
        self.params.lock().get(name).cloned()
    }

    pub fn params(&self) -> HashMap<String, String> {
        self.params.lock().clone()
    }

    /// Replaces all parameters.
    pub fn set_params(&self, params: HashMap<String, String>) {
        *self.params.lock() = params;
    }

    // =========================================================================
    // Scratch data
    // =========================================================================

    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.data.lock().insert(key.into(), Box::new(value));
    }

    /// Returns a clone of the value under `key` if it has type `T`.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.data
            .lock()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> bool {
        self.data.lock().remove(key).is_some()
    }

    // =========================================================================
    // Outbound messages
    // =========================================================================

    /// Runs `f` with exclusive access to the reply bank.
    pub fn with_messages<R>(&self, f: impl FnOnce(&mut MessageBank) -> R) -> R {
        f(&mut self.messages.lock())
    }

    /// Queues a message for the reply.
    pub fn append(&self, message: Message) -> BuildResult<()> {
        self.messages.lock().append(message)
    }

    pub fn add_text(&self, text: impl Into<String>) -> BuildResult<()> {
        self.messages.lock().add_text(text)
    }

    pub fn pending_messages(&self) -> Vec<Message> {
        self.messages.lock().messages().to_vec()
    }

    /// Sends the queued messages as the reply to this event.
    pub(crate) async fn flush(&self) -> Result<(), BotError> {
        let bank = self.messages.lock().clone();
        if bank.is_empty() {
            trace!("No messages queued");
            return Ok(());
        }
        let Some(reply_token) = self.event.reply_token.as_deref() else {
            return Err(BotError::MissingReplyToken);
        };
        bank.reply(self.platform.as_ref(), reply_token)
            .await
            .map_err(BotError::Delivery)
    }

    // =========================================================================
    // Sender
    // =========================================================================

    pub fn user_id(&self) -> Option<&str> {
        self.event.user_id()
    }

    /// The sender's profile, fetched once per event.
    pub async fn user(&self) -> Result<&UserProfile, BotError> {
        let user_id = self.user_id().ok_or(BotError::MissingUserId)?;
        self.profile
            .get_or_try_init(|| async {
                debug!(user_id = %user_id, "Fetching user profile");
                self.platform
                    .fetch_profile(user_id)
                    .await
                    .map_err(BotError::ProfileFetch)
            })
            .await
    }
}

impl std::fmt::Debug for BotContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotContext")
            .field("event", &self.event.kind_name())
            .field("params", &*self.params.lock())
            .field("data_keys", &self.data.lock().keys().collect::<Vec<_>>())
            .field("pending_messages", &self.messages.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lynx_core::testing::MockPlatform;
    use lynx_core::{EventKind, Source};
    use std::sync::Arc;

    fn context(platform: Arc<MockPlatform>, source: Source) -> BotContext {
        let event = Event::new(source, EventKind::Follow).with_reply_token("token");
        BotContext::new(event, platform, 5)
    }

    #[test]
    fn test_scratch_data() {
        let ctx = context(Arc::new(MockPlatform::new()), Source::user("U1"));
        ctx.set("count", 3_u32);

        assert_eq!(ctx.get::<u32>("count"), Some(3));
        assert_eq!(ctx.get::<String>("count"), None);
        assert!(ctx.remove("count"));
        assert!(!ctx.contains("count"));
    }

    #[test]
    fn test_params_are_replaced() {
        let ctx = context(Arc::new(MockPlatform::new()), Source::user("U1"));
        ctx.set_params(HashMap::from([("a".to_string(), "1".to_string())]));
        ctx.set_params(HashMap::from([("b".to_string(), "2".to_string())]));

        assert_eq!(ctx.param("a"), None);
        assert_eq!(ctx.param("b").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_profile_is_fetched_once() {
        let platform = Arc::new(MockPlatform::new().with_profile(UserProfile {
            user_id: "U1".into(),
            display_name: "Julian".into(),
            ..Default::default()
        }));
        let ctx = context(platform.clone(), Source::user("U1"));

        assert_eq!(ctx.user().await.unwrap().display_name, "Julian");
        assert_eq!(ctx.user().await.unwrap().display_name, "Julian");
        assert_eq!(platform.profile_calls(), 1);
    }

    #[tokio::test]
    async fn test_profile_requires_user() {
        let ctx = context(Arc::new(MockPlatform::new()), Source::group("G1"));
        assert!(matches!(ctx.user().await, Err(BotError::MissingUserId)));
    }

    #[tokio::test]
    async fn test_profile_fetch_failure() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = context(platform.clone(), Source::user("U404"));
        assert!(matches!(ctx.user().await, Err(BotError::ProfileFetch(_))));
    }

    #[tokio::test]
    async fn test_flush_replies_with_queued_messages() {
        let platform = Arc::new(MockPlatform::new());
        let ctx = context(platform.clone(), Source::user("U1"));

        ctx.flush().await.unwrap();
        assert!(platform.replies().is_empty());

        ctx.add_text("hello").unwrap();
        ctx.flush().await.unwrap();
        assert_eq!(
            platform.replies(),
            vec![("token".to_string(), vec![Message::text("hello")])]
        );
    }

    #[tokio::test]
    async fn test_flush_without_reply_token() {
        let platform = Arc::new(MockPlatform::new());
        let event = Event::new(Source::user("U1"), EventKind::Unfollow);
        let ctx = BotContext::new(event, platform, 5);

        ctx.add_text("bye").unwrap();
        assert!(matches!(ctx.flush().await, Err(BotError::MissingReplyToken)));
    }
}
