//! Handler types.
//!
//! A handler is an async function of the shared [`BotContext`] that decides
//! whether the chain goes on:
//!
//! ```rust,ignore
//! async fn greet(ctx: Arc<BotContext>) -> HandlerResult {
//!     ctx.add_text("hello")?;
//!     Ok(Flow::Stop)
//! }
//! ```
//!
//! Returning `Err` stops the chain as well, after the error handlers ran.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::context::BotContext;
use crate::error::BotError;

/// What the router does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next handler.
    Continue,
    /// The event is handled; skip the remaining handlers.
    Stop,
}

impl Flow {
    /// `Continue` when `next` is true.
    pub fn next_if(next: bool) -> Self {
        if next { Self::Continue } else { Self::Stop }
    }
}

pub type HandlerResult = Result<Flow, BotError>;

/// A type-erased handler.
pub type BoxedHandler = Arc<dyn Fn(Arc<BotContext>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Observes errors raised by handlers or by reply delivery.
pub type ErrorHandler = Arc<dyn Fn(&BotContext, &BotError) + Send + Sync>;

/// Erases an async function into a [`BoxedHandler`].
pub fn into_handler<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<BotContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx| f(ctx).boxed())
}
