//! # Lynx Framework
//!
//! Event routing for bot applications.
//!
//! This layer provides:
//! - [`Router`], an ordered handler chain with short-circuit semantics
//! - Kind-filtered handler wrappers (text, image, follow, postback, ...)
//! - [`TextPattern`] for extracting named parameters from text messages
//! - [`BotContext`], the state shared by all handlers of one event
//!
//! Handlers queue replies on the context; the router sends them once the
//! chain has ended.

pub mod context;
pub mod error;
pub mod handler;
pub mod matchers;
pub mod pattern;
pub mod router;

pub use context::BotContext;
pub use error::{BotError, PatternError};
pub use handler::{BoxedHandler, ErrorHandler, Flow, HandlerResult, into_handler};
pub use matchers::{JoinTarget, Location, Sticker};
pub use pattern::TextPattern;
pub use router::{DispatchOutcome, Router};

pub mod prelude {
    pub use crate::{BotContext, BotError, Flow, HandlerResult, Router, TextPattern};
}
