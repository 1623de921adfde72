//! Kind-filtered handler wrappers.
//!
//! Each function here wraps a typed handler into a [`BoxedHandler`] that
//! first checks the event kind. On a mismatch the wrapper returns
//! [`Flow::Continue`] without calling the typed handler, so the chain moves
//! on. On a match the wrapper extracts the kind's payload and hands it over.
//!
//! ```rust,ignore
//! let router = Router::new(platform)
//!     .register(matchers::text(|ctx, text| async move { ... }))
//!     .register(matchers::postback(|ctx, data| async move { ... }));
//! ```
//!
//! [`Router`](crate::Router) exposes all of these as `on_*` methods.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use tracing::trace;

use lynx_core::{BeaconKind, EventKind, MessageContent, Source};

use crate::context::BotContext;
use crate::error::BotError;
use crate::handler::{BoxedHandler, Flow, HandlerResult, into_handler};
use crate::pattern::TextPattern;

/// Payload of a location message.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub title: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Payload of a sticker message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sticker {
    pub package_id: String,
    pub sticker_id: String,
}

/// Where the bot was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    Group(String),
    Room(String),
}

impl JoinTarget {
    pub fn id(&self) -> &str {
        match self {
            Self::Group(id) | Self::Room(id) => id,
        }
    }
}

fn pass() -> BoxFuture<'static, HandlerResult> {
    ready(Ok(Flow::Continue)).boxed()
}

fn fail(err: BotError) -> BoxFuture<'static, HandlerResult> {
    ready(Err(err)).boxed()
}

fn source_kind(source: &Source) -> &'static str {
    match source {
        Source::User { .. } => "user",
        Source::Group { .. } => "group",
        Source::Room { .. } => "room",
        Source::Unsupported => "unsupported",
    }
}

/// Wraps a handler that filters nothing.
pub fn event<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    into_handler(f)
}

/// Handles text messages.
pub fn text<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    filtered_text(|_| true, f)
}

/// Handles text messages accepted by `filter`.
pub fn filtered_text<P, F, Fut>(filter: P, f: F) -> BoxedHandler
where
    P: Fn(&str) -> bool + Send + Sync + 'static,
    F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        let Some(text) = ctx.event().text().filter(|t| filter(t)).map(str::to_owned) else {
            return pass();
        };
        f(ctx, text).boxed()
    })
}

/// Handles text messages matching `pattern`.
///
/// On a match the context parameters are replaced by the captures before
/// the handler runs.
pub fn text_with<F, Fut>(pattern: TextPattern, f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        let Some(text) = ctx.event().text().map(str::to_owned) else {
            return pass();
        };
        let Some(captures) = pattern.captures(&text) else {
            trace!(pattern = %pattern, "Text did not match pattern");
            return pass();
        };
        ctx.set_params(captures.into_iter().collect());
        f(ctx, text).boxed()
    })
}

fn binary<F, Fut>(select: fn(&MessageContent) -> bool, f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |ctx: Arc<BotContext>| {
        let Some(id) = ctx
            .event()
            .message()
            .filter(|m| select(m))
            .and_then(MessageContent::id)
            .map(str::to_owned)
        else {
            return pass();
        };

        let f = Arc::clone(&f);
        async move {
            let content = ctx
                .platform()
                .fetch_content(&id)
                .await
                .map_err(BotError::ContentFetch)?;
            trace!(message_id = %id, bytes = content.len(), "Fetched message content");
            f(ctx, content).await
        }
        .boxed()
    })
}

/// Handles image messages with their downloaded content.
pub fn image<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    binary(|m| matches!(m, MessageContent::Image { .. }), f)
}

/// Handles video messages with their downloaded content.
pub fn video<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    binary(|m| matches!(m, MessageContent::Video { .. }), f)
}

/// Handles audio messages with their downloaded content.
pub fn audio<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    binary(|m| matches!(m, MessageContent::Audio { .. }), f)
}

pub fn location<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, Location) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        let Some(MessageContent::Location {
            title,
            address,
            latitude,
            longitude,
            ..
        }) = ctx.event().message()
        else {
            return pass();
        };
        let location = Location {
            title: title.clone(),
            address: address.clone(),
            latitude: *latitude,
            longitude: *longitude,
        };
        f(ctx, location).boxed()
    })
}

pub fn sticker<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, Sticker) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        let Some(MessageContent::Sticker {
            package_id,
            sticker_id,
            ..
        }) = ctx.event().message()
        else {
            return pass();
        };
        let sticker = Sticker {
            package_id: package_id.clone(),
            sticker_id: sticker_id.clone(),
        };
        f(ctx, sticker).boxed()
    })
}

fn unit_kind<F, Fut>(kind: EventKind, f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        if ctx.event().kind != kind {
            return pass();
        }
        f(ctx).boxed()
    })
}

pub fn follow<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    unit_kind(EventKind::Follow, f)
}

pub fn unfollow<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    unit_kind(EventKind::Unfollow, f)
}

/// Handles the bot joining a group or room.
///
/// A join event from any other source fails with
/// [`BotError::UnsupportedJoinSource`].
pub fn join<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, JoinTarget) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        if ctx.event().kind != EventKind::Join {
            return pass();
        }
        let target = match &ctx.event().source {
            Source::Group { group_id, .. } => JoinTarget::Group(group_id.clone()),
            Source::Room { room_id, .. } => JoinTarget::Room(room_id.clone()),
            other => {
                return fail(BotError::UnsupportedJoinSource {
                    event: "join",
                    kind: source_kind(other),
                });
            }
        };
        f(ctx, target).boxed()
    })
}

/// Handles the bot leaving a group; the handler receives the group ID.
///
/// A leave event from any other source fails with
/// [`BotError::UnsupportedJoinSource`].
pub fn leave<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        if ctx.event().kind != EventKind::Leave {
            return pass();
        }
        let group_id = match &ctx.event().source {
            Source::Group { group_id, .. } => group_id.clone(),
            other => {
                return fail(BotError::UnsupportedJoinSource {
                    event: "leave",
                    kind: source_kind(other),
                });
            }
        };
        f(ctx, group_id).boxed()
    })
}

/// Handles postbacks; the handler receives the postback data.
pub fn postback<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        let EventKind::Postback { postback } = &ctx.event().kind else {
            return pass();
        };
        let data = postback.data.clone();
        f(ctx, data).boxed()
    })
}

fn beacon<F, Fut>(kind: BeaconKind, f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Arc<BotContext>| {
        let hwid = match &ctx.event().kind {
            EventKind::Beacon { beacon } if beacon.kind == kind => beacon.hwid.clone(),
            _ => return pass(),
        };
        f(ctx, hwid).boxed()
    })
}

/// Handles a user entering beacon range; the handler receives the hardware ID.
pub fn beacon_enter<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    beacon(BeaconKind::Enter, f)
}

/// Handles a user leaving beacon range; the handler receives the hardware ID.
pub fn beacon_leave<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    beacon(BeaconKind::Leave, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lynx_core::testing::MockPlatform;
    use lynx_core::{Beacon, Event, Postback};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx_for(event: Event, platform: MockPlatform) -> Arc<BotContext> {
        Arc::new(BotContext::new(event, Arc::new(platform), 5))
    }

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
    }

    fn image_event(id: &str) -> Event {
        Event::new(
            Source::user("U1"),
            EventKind::Message {
                message: MessageContent::Image { id: id.into() },
            },
        )
    }

    #[tokio::test]
    async fn test_text_skips_other_kinds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = text(move |_ctx, _text| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(Flow::Stop) }
        });

        let follow = Event::new(Source::user("U1"), EventKind::Follow);
        let result = handler(ctx_for(follow, MockPlatform::new())).await;
        assert!(matches!(result, Ok(Flow::Continue)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let result = handler(ctx_for(text_event("hi"), MockPlatform::new())).await;
        assert!(matches!(result, Ok(Flow::Stop)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_filtered_text() {
        let handler = filtered_text(
            |t| t.starts_with('!'),
            |_ctx, text| async move {
                assert_eq!(text, "!help");
                Ok(Flow::Stop)
            },
        );

        let skipped = handler(ctx_for(text_event("help"), MockPlatform::new())).await;
        assert!(matches!(skipped, Ok(Flow::Continue)));
        let handled = handler(ctx_for(text_event("!help"), MockPlatform::new())).await;
        assert!(matches!(handled, Ok(Flow::Stop)));
    }

    #[tokio::test]
    async fn test_text_with_sets_params() {
        let pattern = TextPattern::new("Hello, {{name}}").unwrap();
        let handler = text_with(pattern, |ctx, _text| async move {
            assert_eq!(ctx.param("name").as_deref(), Some("Julian"));
            Ok(Flow::Stop)
        });

        let ctx = ctx_for(text_event("Hello, Julian"), MockPlatform::new());
        assert!(matches!(handler(ctx.clone()).await, Ok(Flow::Stop)));
        assert_eq!(ctx.params().len(), 1);

        let ctx = ctx_for(text_event("Bye, Julian"), MockPlatform::new());
        assert!(matches!(handler(ctx.clone()).await, Ok(Flow::Continue)));
        assert!(ctx.params().is_empty());
    }

    #[tokio::test]
    async fn test_image_fetches_content() {
        let handler = image(|_ctx, content| async move {
            assert_eq!(content, b"png".to_vec());
            Ok(Flow::Stop)
        });

        let platform = MockPlatform::new().with_content("42", b"png".to_vec());
        let result = handler(ctx_for(image_event("42"), platform)).await;
        assert!(matches!(result, Ok(Flow::Stop)));
    }

    #[tokio::test]
    async fn test_image_fetch_failure_stops_without_calling_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = image(move |_ctx, _content| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(Flow::Continue) }
        });

        let result = handler(ctx_for(image_event("missing"), MockPlatform::new())).await;
        assert!(matches!(result, Err(BotError::ContentFetch(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_video_ignores_images() {
        let handler = video(|_ctx, _content| async { Ok(Flow::Stop) });
        let platform = MockPlatform::new().with_content("42", Vec::new());
        let result = handler(ctx_for(image_event("42"), platform)).await;
        assert!(matches!(result, Ok(Flow::Continue)));
    }

    #[tokio::test]
    async fn test_join_sources() {
        let handler = join(|_ctx, target| async move {
            assert_eq!(target, JoinTarget::Room("R1".into()));
            Ok(Flow::Stop)
        });

        let room = Event::new(Source::room("R1"), EventKind::Join);
        assert!(matches!(
            handler(ctx_for(room, MockPlatform::new())).await,
            Ok(Flow::Stop)
        ));

        let user = Event::new(Source::user("U1"), EventKind::Join);
        assert!(matches!(
            handler(ctx_for(user, MockPlatform::new())).await,
            Err(BotError::UnsupportedJoinSource {
                event: "join",
                kind: "user"
            })
        ));

        let unknown = Event::new(Source::Unsupported, EventKind::Join);
        assert!(matches!(
            handler(ctx_for(unknown, MockPlatform::new())).await,
            Err(BotError::UnsupportedJoinSource {
                kind: "unsupported",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_leave_requires_group() {
        let handler = leave(|_ctx, group_id| async move {
            assert_eq!(group_id, "G1");
            Ok(Flow::Stop)
        });

        let group = Event::new(Source::group("G1"), EventKind::Leave);
        assert!(matches!(
            handler(ctx_for(group, MockPlatform::new())).await,
            Ok(Flow::Stop)
        ));

        let room = Event::new(Source::room("R1"), EventKind::Leave);
        assert!(matches!(
            handler(ctx_for(room, MockPlatform::new())).await,
            Err(BotError::UnsupportedJoinSource { kind: "room", .. })
        ));
    }

    #[tokio::test]
    async fn test_postback_and_beacon() {
        let postback_handler = postback(|_ctx, data| async move {
            assert_eq!(data, "action=buy");
            Ok(Flow::Stop)
        });
        let event = Event::new(
            Source::user("U1"),
            EventKind::Postback {
                postback: Postback {
                    data: "action=buy".into(),
                },
            },
        );
        assert!(matches!(
            postback_handler(ctx_for(event, MockPlatform::new())).await,
            Ok(Flow::Stop)
        ));

        let enter = beacon_enter(|_ctx, hwid| async move {
            assert_eq!(hwid, "d41d8cd98f");
            Ok(Flow::Stop)
        });
        let leave_event = Event::new(
            Source::user("U1"),
            EventKind::Beacon {
                beacon: Beacon {
                    hwid: "d41d8cd98f".into(),
                    kind: BeaconKind::Leave,
                    dm: None,
                },
            },
        );
        assert!(matches!(
            enter(ctx_for(leave_event, MockPlatform::new())).await,
            Ok(Flow::Continue)
        ));
    }
}
