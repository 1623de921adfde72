//! # Lynx Message
//!
//! Builders that turn loosely assembled content into platform messages,
//! refusing anything the platform would reject.
//!
//! - [`ButtonBuilder`], [`ConfirmBuilder`], [`CarouselBuilder`] produce
//!   template messages; they share action handling through [`Actionable`].
//! - [`ColumnTemplate`] renders carousel columns from serializable records.
//! - [`ImagemapBuilder`] produces image map messages.
//! - [`MessageBank`] queues up to five messages for one reply, and
//!   [`PostMan`] pushes a queue to several recipients.
//!
//! Each `build` checks its rules in a fixed order and returns the first
//! violation as a [`BuildError`]; a failed build leaves the builder as it was.
//!
//! ```rust,ignore
//! use lynx_message::prelude::*;
//!
//! let menu = ButtonBuilder::new("What would you like?")
//!     .title("Menu")
//!     .message_action("Coffee", "coffee")
//!     .postback_action("Tea", "drink=tea", "")
//!     .build("menu")?;
//! ```

pub mod action;
pub mod bank;
pub mod button;
pub mod carousel;
pub mod confirm;
pub mod error;
pub mod imagemap;
pub mod template;
pub mod validate;

pub use action::{ActionAccumulator, Actionable};
pub use bank::{MessageBank, PostMan, PushFailure};
pub use button::ButtonBuilder;
pub use carousel::{CarouselBuilder, ColumnBuilder};
pub use confirm::ConfirmBuilder;
pub use error::{BuildError, BuildResult};
pub use imagemap::ImagemapBuilder;
pub use template::{ColumnTemplate, Generated, RecordFailure};

/// Builders and the [`Actionable`] trait in one import.
pub mod prelude {
    pub use crate::{
        Actionable, ButtonBuilder, CarouselBuilder, ColumnBuilder, ColumnTemplate,
        ConfirmBuilder, ImagemapBuilder, MessageBank,
    };
    pub use lynx_core::{ImagemapArea, Message};
}
