//! # Lynx Transport
//!
//! Network side of the Lynx bot framework.
//!
//! ## Features
//!
//! - `http-client` (default): [`LineClient`], a [`Platform`] backed by the
//!   LINE Messaging API
//! - `http-server` (default): [`WebhookServer`], which feeds webhook requests
//!   into a `Router`
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  lynx-framework     │  (router, handlers)
//! ├─────────────────────┤
//! │  lynx-core          │  (Platform trait, events, messages)
//! ├─────────────────────┤
//! │  lynx-transport     │  <- This crate (implementations)
//! ├─────────────────────┤
//! │  Network (HTTP)     │
//! └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lynx_transport::{LineClient, LineClientConfig, WebhookServer};
//!
//! let client = Arc::new(LineClient::new(LineClientConfig::new(secret, token))?);
//! let router = Router::new(client).on_text(|ctx, text| async move {
//!     ctx.add_text(text)?;
//!     Ok(Flow::Stop)
//! });
//!
//! let server = WebhookServer::bind("0.0.0.0:8080", "/callback", router).await?;
//! server.run(shutdown_token).await?;
//! ```
//!
//! [`Platform`]: lynx_core::Platform

#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;
pub mod signature;

#[cfg(feature = "http-client")]
pub use http::{LineClient, LineClientConfig};

#[cfg(feature = "http-server")]
pub use http::{WebhookServer, webhook_router};
