//! Event router for the Lynx framework.
//!
//! The [`Router`] owns an ordered chain of handlers and a list of error
//! handlers. Dispatching an event:
//!
//! 1. Creates a fresh [`BotContext`] for the event
//! 2. Runs handlers in registration order, awaiting each in turn
//! 3. Stops at the first handler returning [`Flow::Stop`] or an error; an
//!    error is first passed to every error handler
//! 4. Flushes the context's message bank as the reply; a delivery error is
//!    passed to the error handlers as well
//!
//! ```rust,ignore
//! let router = Router::new(platform)
//!     .on_text(|ctx, text| async move {
//!         ctx.add_text(text)?;
//!         Ok(Flow::Stop)
//!     })
//!     .on_follow(|ctx| async move {
//!         ctx.add_text("Thanks for adding me!")?;
//!         Ok(Flow::Stop)
//!     })
//!     .on_error(|_ctx, err| tracing::error!(error = %err, "handler failed"));
//! ```
//!
//! # Tower Service Integration
//!
//! `Router` implements `tower::Service<Event>`, so dispatch can be wrapped in
//! Tower middleware such as timeouts or concurrency limits.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, Level, debug, error, span, trace, warn};

use lynx_core::{BoxedPlatform, Event, WebhookResult};
use lynx_message::validate::MAX_MESSAGES_PER_REPLY;

use crate::context::BotContext;
use crate::error::BotError;
use crate::handler::{BoxedHandler, ErrorHandler, Flow, HandlerResult, into_handler};
use crate::matchers::{self, JoinTarget, Location, Sticker};
use crate::pattern::TextPattern;

/// How a handler chain ended for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every handler returned [`Flow::Continue`].
    Exhausted,
    /// A handler returned [`Flow::Stop`].
    Stopped,
    /// A handler returned an error.
    Failed,
}

/// Internal data for a Router.
///
/// Implements `Clone` to support `Arc::make_mut` while handlers are being
/// registered.
#[derive(Clone)]
struct RouterInner {
    platform: BoxedPlatform,
    handlers: Vec<BoxedHandler>,
    error_handlers: Vec<ErrorHandler>,
    message_capacity: usize,
}

/// Ordered handler chain bound to a platform.
///
/// Cloning is cheap; clones share the registered handlers.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    pub fn new(platform: BoxedPlatform) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                platform,
                handlers: Vec::new(),
                error_handlers: Vec::new(),
                message_capacity: MAX_MESSAGES_PER_REPLY,
            }),
        }
    }

    fn inner_mut(&mut self) -> &mut RouterInner {
        Arc::make_mut(&mut self.inner)
    }

    /// Sets how many messages one reply may carry.
    ///
    /// Values above the platform limit of five are lowered to it.
    pub fn message_capacity(mut self, capacity: usize) -> Self {
        if capacity > MAX_MESSAGES_PER_REPLY {
            warn!(
                requested = capacity,
                limit = MAX_MESSAGES_PER_REPLY,
                "Message capacity exceeds the per-reply limit, clamping"
            );
        }
        self.inner_mut().message_capacity = capacity.min(MAX_MESSAGES_PER_REPLY);
        self
    }

    /// Appends a handler to the chain.
    pub fn register(mut self, handler: BoxedHandler) -> Self {
        self.inner_mut().handlers.push(handler);
        self
    }

    /// Registers a handler that sees every event.
    pub fn on_event<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(into_handler(f))
    }

    pub fn on_text<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::text(f))
    }

    pub fn on_filtered_text<P, F, Fut>(self, filter: P, f: F) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
        F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::filtered_text(filter, f))
    }

    /// Registers a handler for texts matching `pattern`; the captures are
    /// available through [`BotContext::param`].
    pub fn on_text_with<F, Fut>(self, pattern: TextPattern, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::text_with(pattern, f))
    }

    pub fn on_image<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::image(f))
    }

    pub fn on_video<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::video(f))
    }

    pub fn on_audio<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::audio(f))
    }

    pub fn on_location<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, Location) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::location(f))
    }

    pub fn on_sticker<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, Sticker) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::sticker(f))
    }

    pub fn on_follow<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::follow(f))
    }

    pub fn on_unfollow<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::unfollow(f))
    }

    pub fn on_join<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, JoinTarget) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::join(f))
    }

    pub fn on_leave<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::leave(f))
    }

    pub fn on_postback<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::postback(f))
    }

    pub fn on_beacon_enter<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::beacon_enter(f))
    }

    pub fn on_beacon_leave<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(matchers::beacon_leave(f))
    }

    /// Registers an error handler.
    ///
    /// Error handlers run in registration order for every handler error and
    /// every failed reply.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&BotContext, &BotError) + Send + Sync + 'static,
    {
        self.inner_mut().error_handlers.push(Arc::new(f));
        self
    }

    pub fn handler_count(&self) -> usize {
        self.inner.handlers.len()
    }

    pub fn platform(&self) -> &BoxedPlatform {
        &self.inner.platform
    }

    /// Creates the context an event is dispatched with.
    pub fn new_context(&self, event: Event) -> Arc<BotContext> {
        Arc::new(BotContext::new(
            event,
            Arc::clone(&self.inner.platform),
            self.inner.message_capacity,
        ))
    }

    fn report(&self, ctx: &BotContext, err: &BotError) {
        for handler in &self.inner.error_handlers {
            handler(ctx, err);
        }
    }

    /// Runs the handler chain for one event and flushes its reply.
    pub async fn dispatch(&self, event: Event) -> DispatchOutcome {
        let span = span!(Level::DEBUG, "dispatch", event = event.kind_name());
        let ctx = self.new_context(event);

        async move {
            let mut outcome = DispatchOutcome::Exhausted;

            for (index, handler) in self.inner.handlers.iter().enumerate() {
                match handler(Arc::clone(&ctx)).await {
                    Ok(Flow::Continue) => {
                        trace!(handler_index = index, "Handler passed, continuing");
                    }
                    Ok(Flow::Stop) => {
                        debug!(handler_index = index, "Handler stopped the chain");
                        outcome = DispatchOutcome::Stopped;
                        break;
                    }
                    Err(err) => {
                        warn!(handler_index = index, error = %err, "Handler failed");
                        self.report(&ctx, &err);
                        outcome = DispatchOutcome::Failed;
                        break;
                    }
                }
            }

            if let Err(err) = ctx.flush().await {
                error!(error = %err, "Failed to deliver reply");
                self.report(&ctx, &err);
            }

            outcome
        }
        .instrument(span)
        .await
    }

    /// Dispatches events one after another, in order.
    pub async fn dispatch_all(&self, events: Vec<Event>) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.dispatch(event).await);
        }
        outcomes
    }

    /// Verifies and decodes a raw webhook body, then dispatches its events.
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: &str,
    ) -> WebhookResult<Vec<DispatchOutcome>> {
        let events = self.inner.platform.parse_webhook(body, signature)?;
        debug!(count = events.len(), "Received webhook events");
        Ok(self.dispatch_all(events).await)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("handler_count", &self.inner.handlers.len())
            .field("error_handler_count", &self.inner.error_handlers.len())
            .field("message_capacity", &self.inner.message_capacity)
            .finish()
    }
}

impl Service<Event> for Router {
    type Response = DispatchOutcome;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: Event) -> Self::Future {
        let router = self.clone();
        async move { Ok(router.dispatch(event).await) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lynx_core::testing::MockPlatform;
    use lynx_core::{EventKind, Message, MessageContent, Source};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn text_event(text: &str) -> Event {
        Event::new(
            Source::user("U1"),
            EventKind::Message {
                message: MessageContent::Text {
                    id: "1".into(),
                    text: text.into(),
                },
            },
        )
        .with_reply_token("token")
    }

    fn counting(counter: &Arc<AtomicUsize>, flow: Flow) -> BoxedHandler {
        let counter = Arc::clone(counter);
        into_handler(move |_ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(flow) }
        })
    }

    #[tokio::test]
    async fn test_continue_runs_every_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new(Arc::new(MockPlatform::new()))
            .register(counting(&calls, Flow::Continue))
            .register(counting(&calls, Flow::Continue));

        assert_eq!(router.dispatch(text_event("hi")).await, DispatchOutcome::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stop_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new(Arc::new(MockPlatform::new()))
            .register(counting(&calls, Flow::Stop))
            .register(counting(&calls, Flow::Continue));

        assert_eq!(router.dispatch(text_event("hi")).await, DispatchOutcome::Stopped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_reaches_every_error_handler_and_stops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&seen);
        let second = Arc::clone(&seen);

        let router = Router::new(Arc::new(MockPlatform::new()))
            .on_event(|_ctx| async { Err(BotError::custom("Error on purpose")) })
            .register(counting(&calls, Flow::Continue))
            .on_error(move |_ctx, err| first.lock().push(format!("first: {err}")))
            .on_error(move |_ctx, err| second.lock().push(format!("second: {err}")));

        assert_eq!(router.dispatch(text_event("hi")).await, DispatchOutcome::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            *seen.lock(),
            ["first: Error on purpose", "second: Error on purpose"]
        );
    }

    #[tokio::test]
    async fn test_reply_is_flushed_after_chain() {
        let platform = Arc::new(MockPlatform::new());
        let router = Router::new(platform.clone())
            .on_text(|ctx, text| async move {
                ctx.add_text(format!("echo: {text}"))?;
                Ok(Flow::Continue)
            })
            .on_text(|ctx, _text| async move {
                ctx.add_text("second")?;
                Ok(Flow::Stop)
            });

        router.dispatch(text_event("hi")).await;
        assert_eq!(
            platform.replies(),
            vec![(
                "token".to_string(),
                vec![Message::text("echo: hi"), Message::text("second")]
            )]
        );
    }

    #[tokio::test]
    async fn test_messages_queued_before_error_are_still_sent() {
        let platform = Arc::new(MockPlatform::new());
        let router = Router::new(platform.clone())
            .on_text(|ctx, _text| async move {
                ctx.add_text("partial")?;
                Err(BotError::custom("boom"))
            })
            .on_error(|ctx, _err| {
                let _ = ctx.add_text("sorry");
            });

        assert_eq!(router.dispatch(text_event("hi")).await, DispatchOutcome::Failed);
        assert_eq!(
            platform.replies()[0].1,
            vec![Message::text("partial"), Message::text("sorry")]
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        let router = Router::new(Arc::new(MockPlatform::new().failing_replies()))
            .on_text(|ctx, _text| async move {
                ctx.add_text("hello")?;
                Ok(Flow::Stop)
            })
            .on_error(move |_ctx, err| {
                assert!(matches!(err, BotError::Delivery(_)));
                counter.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(router.dispatch(text_event("hi")).await, DispatchOutcome::Stopped);
        assert_eq!(reported.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bank_overflow_surfaces_as_build_error() {
        let router = Router::new(Arc::new(MockPlatform::new()))
            .message_capacity(1)
            .on_text(|ctx, _text| async move {
                ctx.add_text("one")?;
                ctx.add_text("two")?;
                Ok(Flow::Stop)
            });

        assert_eq!(router.dispatch(text_event("hi")).await, DispatchOutcome::Failed);
    }

    #[tokio::test]
    async fn test_message_capacity_is_clamped_to_reply_limit() {
        let platform = Arc::new(MockPlatform::new());
        let router = Router::new(platform.clone())
            .message_capacity(usize::MAX)
            .on_text(|ctx, _text| async move {
                for i in 0..6 {
                    ctx.add_text(format!("message {i}"))?;
                }
                Ok(Flow::Stop)
            });
        assert!(format!("{router:?}").contains("message_capacity: 5"));

        assert_eq!(router.dispatch(text_event("hi")).await, DispatchOutcome::Failed);
        let replies = platform.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].1.len(), 5);
    }

    #[test]
    fn test_clones_do_not_share_later_registrations() {
        let base = Router::new(Arc::new(MockPlatform::new()));
        let extended = base.clone().on_follow(|_ctx| async { Ok(Flow::Stop) });

        assert_eq!(base.handler_count(), 0);
        assert_eq!(extended.handler_count(), 1);
        assert_eq!(
            tokio_test::block_on(base.dispatch(text_event("hi"))),
            DispatchOutcome::Exhausted
        );
    }

    #[tokio::test]
    async fn test_router_as_service() {
        let router = Router::new(Arc::new(MockPlatform::new()))
            .on_text(|_ctx, _text| async { Ok(Flow::Stop) });

        let outcome = router.oneshot(text_event("hi")).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Stopped);
    }

    #[tokio::test]
    async fn test_handle_webhook_rejects_bad_signature() {
        let router = Router::new(Arc::new(MockPlatform::new().with_signature("good")));
        let body = br#"{"events":[]}"#;

        assert!(router.handle_webhook(body, "bad").await.is_err());
        assert!(router.handle_webhook(body, "good").await.unwrap().is_empty());
    }
}
