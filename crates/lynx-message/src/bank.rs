//! Message banks: bounded outbound queues flushed as one reply or push.

use std::ops::{Deref, DerefMut};

use lynx_core::{ApiError, ApiResult, BoxedPlatform, Message, Platform};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::error::{BuildError, BuildResult};
use crate::validate::MAX_MESSAGES_PER_REPLY;

/// Ordered outbound messages, capped at the number one request may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBank {
    messages: Vec<Message>,
    capacity: usize,
}

impl Default for MessageBank {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBank {
    /// Creates a bank holding at most five messages.
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGES_PER_REPLY)
    }

    /// Creates a bank holding at most `capacity` messages.
    ///
    /// Storage grows on append; nothing is reserved up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Vec::new(),
            capacity,
        }
    }

    /// Appends a message, failing once the bank is full.
    pub fn append(&mut self, message: Message) -> BuildResult<()> {
        if self.messages.len() >= self.capacity {
            return Err(BuildError::TooManyMessages {
                limit: self.capacity,
            });
        }
        trace!(kind = message.type_name(), len = self.messages.len() + 1, "Queued message");
        self.messages.push(message);
        Ok(())
    }

    pub fn add_text(&mut self, text: impl Into<String>) -> BuildResult<()> {
        self.append(Message::text(text))
    }

    pub fn add_sticker(
        &mut self,
        package_id: impl Into<String>,
        sticker_id: impl Into<String>,
    ) -> BuildResult<()> {
        self.append(Message::sticker(package_id, sticker_id))
    }

    pub fn add_location(
        &mut self,
        title: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> BuildResult<()> {
        self.append(Message::location(title, address, latitude, longitude))
    }

    pub fn add_image(
        &mut self,
        original: impl Into<String>,
        preview: impl Into<String>,
    ) -> BuildResult<()> {
        self.append(Message::image(original, preview))
    }

    pub fn add_video(
        &mut self,
        original: impl Into<String>,
        preview: impl Into<String>,
    ) -> BuildResult<()> {
        self.append(Message::video(original, preview))
    }

    /// `duration` is in milliseconds.
    pub fn add_audio(&mut self, original: impl Into<String>, duration: u64) -> BuildResult<()> {
        self.append(Message::audio(original, duration))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Sends the queued messages as the reply for `reply_token`.
    ///
    /// Does nothing when the bank is empty.
    pub async fn reply(&self, platform: &dyn Platform, reply_token: &str) -> ApiResult<()> {
        if self.messages.is_empty() {
            trace!("Message bank empty, skipping reply");
            return Ok(());
        }
        debug!(count = self.messages.len(), "Sending reply");
        platform.reply(reply_token, &self.messages).await
    }

    /// Pushes the queued messages to `to`, even when the bank is empty.
    pub async fn push(&self, platform: &dyn Platform, to: &str) -> ApiResult<()> {
        debug!(to = %to, count = self.messages.len(), "Pushing messages");
        platform.push(to, &self.messages).await
    }
}

/// A push to one of several targets failed.
#[derive(Debug, Clone, Error)]
#[error("push to {target} failed: {source}")]
pub struct PushFailure {
    /// Targets that received the messages before the failure, in order.
    pub delivered: Vec<String>,
    pub target: String,
    pub source: ApiError,
}

/// A message bank bound to a platform, for pushing outside a reply.
///
/// Derefs to its [`MessageBank`], so messages are queued the same way.
pub struct PostMan {
    platform: BoxedPlatform,
    bank: MessageBank,
}

impl PostMan {
    pub fn new(platform: BoxedPlatform) -> Self {
        Self::with_bank(platform, MessageBank::new())
    }

    pub fn with_bank(platform: BoxedPlatform, bank: MessageBank) -> Self {
        Self { platform, bank }
    }

    /// Pushes the queued messages to each target in turn.
    ///
    /// Stops at the first failure. The queue is cleared only when every
    /// target received the messages.
    pub async fn send_to<I, S>(&mut self, targets: I) -> Result<Vec<String>, PushFailure>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut delivered = Vec::new();
        for target in targets {
            let target = target.into();
            if let Err(source) = self.bank.push(self.platform.as_ref(), &target).await {
                warn!(target = %target, error = %source, delivered = delivered.len(), "Push failed");
                return Err(PushFailure {
                    delivered,
                    target,
                    source,
                });
            }
            delivered.push(target);
        }

        self.bank.clear();
        Ok(delivered)
    }
}

impl Deref for PostMan {
    type Target = MessageBank;

    fn deref(&self) -> &Self::Target {
        &self.bank
    }
}

impl DerefMut for PostMan {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bank
    }
}
