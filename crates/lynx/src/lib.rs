//! # Lynx
//!
//! A type-safe bot framework for the LINE Messaging API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────┐     ┌──────────────────────────────┐
//! │   Runtime   │────▶│  Router  │────▶│ handler 1 ─▶ handler 2 ─▶ ...│
//! │ (webhooks)  │     │          │     └──────────────────────────────┘
//! └─────────────┘     └──────────┘            │ queued messages
//!        ▲                  │                 ▼
//!        └──── reply ───────┴──────── Message bank
//! ```
//!
//! - **Runtime**: configuration, logging, the webhook server and the API client
//! - **Router**: runs registered handlers in order until one stops the chain
//! - **Handlers**: async functions receiving the shared [`BotContext`]
//! - **Messages**: validated builders for buttons, confirms, carousels and
//!   image maps
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lynx::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = LynxRuntime::new()?;
//!     runtime
//!         .run(|router| {
//!             router.on_text(|ctx, text| async move {
//!                 ctx.add_text(text)?;
//!                 Ok(Flow::Stop)
//!             })
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: read `lynx.toml` (default)
//! - `yaml-config`: read `lynx.yaml`
//! - `json-log`: JSON log lines
//!
//! [`BotContext`]: lynx_framework::BotContext

pub use lynx_core as core;
pub use lynx_framework as framework;
pub use lynx_message as message;
pub use lynx_runtime as runtime;
pub use lynx_transport as transport;

/// Commonly used types for building bots.
///
/// ```rust,ignore
/// use lynx::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use lynx_runtime::{LynxConfig, LynxRuntime};

    // Routing and handlers
    pub use lynx_framework::{
        BotContext, BotError, DispatchOutcome, Flow, HandlerResult, JoinTarget, Location, Router,
        Sticker, TextPattern,
    };

    // Message builders
    pub use lynx_message::prelude::*;

    // Events
    pub use lynx_core::{Event, EventKind, MessageContent, Source, UserProfile};
}
