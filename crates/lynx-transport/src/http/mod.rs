//! HTTP transport.
//!
//! This module provides the Messaging API client and the webhook server.

#[cfg(feature = "http-client")]
mod client;
#[cfg(feature = "http-client")]
pub use client::{
    DEFAULT_API_ENDPOINT, DEFAULT_DATA_ENDPOINT, DEFAULT_TIMEOUT, LineClient, LineClientConfig,
};

#[cfg(feature = "http-server")]
mod server;
#[cfg(feature = "http-server")]
pub use server::{DEFAULT_WEBHOOK_PATH, WebhookServer, webhook_router};
