//! Image map builder.

use lynx_core::{BaseSize, ImagemapAction, ImagemapArea, Message};

use crate::error::{BuildError, BuildResult};
use crate::validate::validate_imagemap_action;

/// Accumulates an image map: a base image and tappable areas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagemapBuilder {
    base_url: String,
    alt_text: String,
    base_size: BaseSize,
    actions: Vec<ImagemapAction>,
}

impl ImagemapBuilder {
    pub fn new(
        base_url: impl Into<String>,
        alt_text: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            alt_text: alt_text.into(),
            base_size: BaseSize { width, height },
            actions: Vec::new(),
        }
    }

    /// Tapping `area` sends `text` as a message from the user.
    pub fn message_action(mut self, text: impl Into<String>, area: ImagemapArea) -> Self {
        self.actions.push(ImagemapAction::Message {
            text: text.into(),
            area,
        });
        self
    }

    /// Tapping `area` opens `link_uri`.
    pub fn uri_action(mut self, link_uri: impl Into<String>, area: ImagemapArea) -> Self {
        self.actions.push(ImagemapAction::Uri {
            link_uri: link_uri.into(),
            area,
        });
        self
    }

    pub fn build(&self) -> BuildResult<Message> {
        if self.actions.is_empty() {
            return Err(BuildError::NoAction);
        }
        let BaseSize { width, height } = self.base_size;
        if width == 0 || height == 0 {
            return Err(BuildError::InvalidMapSize { width, height });
        }
        for action in &self.actions {
            let area = action.area();
            if area.width == 0 || area.height == 0 {
                return Err(BuildError::InvalidMapSize {
                    width: area.width,
                    height: area.height,
                });
            }
            validate_imagemap_action(action)?;
        }

        Ok(Message::Imagemap {
            base_url: self.base_url.clone(),
            alt_text: self.alt_text.clone(),
            base_size: self.base_size,
            actions: self.actions.clone(),
        })
    }
}
