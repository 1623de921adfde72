//! Buttons template builder.

use lynx_core::{Message, Template};

use crate::action::{ActionAccumulator, Actionable};
use crate::error::{BuildError, BuildResult};
use crate::validate::{
    MAX_BUTTON_ACTIONS, MAX_BUTTON_TEXT, MAX_BUTTON_TEXT_WITH_HEADER, MAX_TITLE, check_https,
    check_length, check_required, validate_template_actions,
};

/// Accumulates a buttons template: optional thumbnail and title, a text and
/// up to four actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonBuilder {
    thumbnail_image_url: Option<String>,
    title: Option<String>,
    text: String,
    actions: ActionAccumulator,
}

impl ButtonBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Image shown above the title. Must be an `https` URL.
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_image_url = non_empty(url.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Validates the accumulated fields and produces a template message.
    pub fn build(&self, alt_text: impl Into<String>) -> BuildResult<Message> {
        check_required("text", &self.text)?;
        if let Some(url) = &self.thumbnail_image_url {
            check_https(url)?;
        }
        if let Some(title) = &self.title {
            check_length("title", title, MAX_TITLE)?;
        }

        let text_limit = if self.title.is_some() && self.thumbnail_image_url.is_some() {
            MAX_BUTTON_TEXT_WITH_HEADER
        } else {
            MAX_BUTTON_TEXT
        };
        check_length("text", &self.text, text_limit)?;

        if self.actions.len() > MAX_BUTTON_ACTIONS {
            return Err(BuildError::TooManyActions {
                limit: MAX_BUTTON_ACTIONS,
                actual: self.actions.len(),
            });
        }
        validate_template_actions(self.actions.as_slice())?;

        Ok(Message::Template {
            alt_text: alt_text.into(),
            template: Template::Buttons {
                thumbnail_image_url: self.thumbnail_image_url.clone(),
                title: self.title.clone(),
                text: self.text.clone(),
                actions: self.actions.to_vec(),
            },
        })
    }
}

impl Actionable for ButtonBuilder {
    fn actions_mut(&mut self) -> &mut ActionAccumulator {
        &mut self.actions
    }
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lynx_core::TemplateAction;

    fn sample() -> ButtonBuilder {
        ButtonBuilder::new("Please select")
            .thumbnail("https://example.com/bot/images/image.jpg")
            .title("Menu")
            .postback_action("Buy", "action=buy&itemid=123", "")
            .postback_action("Add to cart", "action=add&itemid=123", "")
            .uri_action("View detail", "http://example.com/page/123")
    }

    #[test]
    fn test_build_matches_hand_built_message() {
        let message = sample().build("this is a buttons template").unwrap();

        let expected = Message::Template {
            alt_text: "this is a buttons template".into(),
            template: Template::Buttons {
                thumbnail_image_url: Some("https://example.com/bot/images/image.jpg".into()),
                title: Some("Menu".into()),
                text: "Please select".into(),
                actions: vec![
                    TemplateAction::postback("Buy", "action=buy&itemid=123", ""),
                    TemplateAction::postback("Add to cart", "action=add&itemid=123", ""),
                    TemplateAction::uri("View detail", "http://example.com/page/123"),
                ],
            },
        };
        assert_eq!(message, expected);
    }

    #[test]
    fn test_too_many_actions() {
        let builder = sample()
            .message_action("a", "a")
            .message_action("b", "b")
            .message_action("c", "c");

        assert_eq!(
            builder.build("alt"),
            Err(BuildError::TooManyActions {
                limit: 4,
                actual: 6
            })
        );
    }

    #[test]
    fn test_thumbnail_must_be_https() {
        let insecure = sample().thumbnail("http://example.com/bot/images/image.jpg");
        assert!(matches!(
            insecure.build("alt"),
            Err(BuildError::InvalidUrl { .. })
        ));
        assert!(sample().build("alt").is_ok());
    }

    #[test]
    fn test_missing_text() {
        assert_eq!(
            ButtonBuilder::new("").build("alt"),
            Err(BuildError::MissingParameter { field: "text" })
        );
    }

    #[test]
    fn test_text_limit_depends_on_header() {
        let text = "x".repeat(100);

        let headerless = ButtonBuilder::new(text.clone()).title("Menu");
        assert!(headerless.build("alt").is_ok());

        let with_header = headerless.thumbnail("https://example.com/a.jpg");
        assert_eq!(
            with_header.build("alt"),
            Err(BuildError::TextTooLong {
                field: "text",
                limit: 60,
                actual: 100
            })
        );

        let too_long = ButtonBuilder::new("x".repeat(161));
        assert!(matches!(
            too_long.build("alt"),
            Err(BuildError::TextTooLong { limit: 160, .. })
        ));
    }

    #[test]
    fn test_failed_build_leaves_builder_unchanged() {
        let builder = sample().title("t".repeat(41));
        let before = builder.clone();
        assert!(builder.build("alt").is_err());
        assert_eq!(builder, before);
    }

    #[test]
    fn test_action_labels_are_checked() {
        let builder = ButtonBuilder::new("text").message_action("l".repeat(21), "x");
        assert!(matches!(
            builder.build("alt"),
            Err(BuildError::TextTooLong { field: "label", .. })
        ));
    }
}
