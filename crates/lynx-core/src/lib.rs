//! # Lynx Core
//!
//! Shared vocabulary of the Lynx bot framework for the LINE Messaging API.
//!
//! - **Inbound events**: webhook payloads decoded into [`Event`] with a
//!   tagged [`EventKind`] and, for message events, a tagged [`MessageContent`].
//! - **Outbound messages**: [`Message`] and the template/imagemap types it
//!   carries, serialized in the platform's wire format.
//! - **Platform capability**: the narrow [`Platform`] trait through which the
//!   framework verifies webhooks, downloads content, looks up profiles and
//!   delivers messages.
//!
//! ```text
//! ┌──────────┐  parse_webhook   ┌──────────┐   Event    ┌──────────┐
//! │ Platform │─────────────────▶│  Router  │───────────▶│ Handlers │
//! │ (HTTP)   │◀─────────────────│          │◀───────────│          │
//! └──────────┘  reply / push    └──────────┘  Messages  └──────────┘
//! ```

pub mod error;
pub mod event;
pub mod message;
pub mod platform;

#[cfg(feature = "testing")]
pub mod testing;

pub use error::{ApiError, ApiResult, WebhookError, WebhookResult};
pub use event::{
    Beacon, BeaconKind, Event, EventKind, MessageContent, Postback, Source, WebhookPayload,
    parse_payload,
};
pub use message::{
    BaseSize, CarouselColumn, ImagemapAction, ImagemapArea, Message, Template, TemplateAction,
};
pub use platform::{BoxedPlatform, Platform, UserProfile};
