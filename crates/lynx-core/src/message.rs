//! Outbound message model.
//!
//! These types serialize to the JSON objects the platform expects in the
//! `messages` array of reply and push requests. Size limits are not enforced
//! here; the builders in `lynx-message` validate before producing template
//! and imagemap messages.

use serde::{Deserialize, Serialize};

/// A message that can be sent to a user, group or room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Message {
    Text {
        text: String,
    },
    Sticker {
        package_id: String,
        sticker_id: String,
    },
    Location {
        title: String,
        address: String,
        latitude: f64,
        longitude: f64,
    },
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
    Video {
        original_content_url: String,
        preview_image_url: String,
    },
    Audio {
        original_content_url: String,
        /// Length in milliseconds.
        duration: u64,
    },
    Template {
        alt_text: String,
        template: Template,
    },
    Imagemap {
        base_url: String,
        alt_text: String,
        base_size: BaseSize,
        actions: Vec<ImagemapAction>,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn sticker(package_id: impl Into<String>, sticker_id: impl Into<String>) -> Self {
        Self::Sticker {
            package_id: package_id.into(),
            sticker_id: sticker_id.into(),
        }
    }

    pub fn location(
        title: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self::Location {
            title: title.into(),
            address: address.into(),
            latitude,
            longitude,
        }
    }

    pub fn image(original: impl Into<String>, preview: impl Into<String>) -> Self {
        Self::Image {
            original_content_url: original.into(),
            preview_image_url: preview.into(),
        }
    }

    pub fn video(original: impl Into<String>, preview: impl Into<String>) -> Self {
        Self::Video {
            original_content_url: original.into(),
            preview_image_url: preview.into(),
        }
    }

    pub fn audio(original: impl Into<String>, duration: u64) -> Self {
        Self::Audio {
            original_content_url: original.into(),
            duration,
        }
    }

    /// The `type` tag this message serializes with.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Sticker { .. } => "sticker",
            Self::Location { .. } => "location",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Audio { .. } => "audio",
            Self::Template { .. } => "template",
            Self::Imagemap { .. } => "imagemap",
        }
    }
}

/// Body of a template message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Template {
    Buttons {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thumbnail_image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        text: String,
        actions: Vec<TemplateAction>,
    },
    Confirm {
        text: String,
        actions: Vec<TemplateAction>,
    },
    Carousel {
        columns: Vec<CarouselColumn>,
    },
}

/// One column of a carousel template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    pub actions: Vec<TemplateAction>,
}

/// A tappable action attached to a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateAction {
    /// Sends `text` as a message from the user.
    Message { label: String, text: String },
    /// Opens `uri`.
    Uri { label: String, uri: String },
    /// Sends a postback event carrying `data`, optionally echoing `text`.
    Postback {
        label: String,
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl TemplateAction {
    pub fn message(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Message {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn uri(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::Uri {
            label: label.into(),
            uri: uri.into(),
        }
    }

    /// An empty `text` means the postback is silent.
    pub fn postback(
        label: impl Into<String>,
        data: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self::Postback {
            label: label.into(),
            data: data.into(),
            text: (!text.is_empty()).then_some(text),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Message { label, .. } | Self::Uri { label, .. } | Self::Postback { label, .. } => {
                label
            }
        }
    }
}

/// Size of the base image of an imagemap, in pixels at 1040 width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseSize {
    pub width: u32,
    pub height: u32,
}

/// Tappable region of an imagemap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagemapArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImagemapArea {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Action bound to an imagemap area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ImagemapAction {
    Message { text: String, area: ImagemapArea },
    Uri { link_uri: String, area: ImagemapArea },
}

impl ImagemapAction {
    pub fn area(&self) -> &ImagemapArea {
        match self {
            Self::Message { area, .. } | Self::Uri { area, .. } => area,
        }
    }
}
