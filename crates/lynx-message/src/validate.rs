//! Field limits imposed by the platform and the checks that enforce them.
//!
//! All lengths count Unicode scalar values, not bytes.

use lynx_core::{ImagemapAction, TemplateAction};
use url::Url;

use crate::error::{BuildError, BuildResult};

pub const MAX_ACTION_LABEL: usize = 20;
pub const MAX_ACTION_TEXT: usize = 300;
pub const MAX_POSTBACK_DATA: usize = 300;
pub const MAX_IMAGEMAP_TEXT: usize = 400;
pub const MAX_URI: usize = 1000;

pub const MAX_TITLE: usize = 40;

pub const MAX_BUTTON_TEXT: usize = 160;
/// Button text limit once both a title and a thumbnail are shown.
pub const MAX_BUTTON_TEXT_WITH_HEADER: usize = 60;
pub const MAX_BUTTON_ACTIONS: usize = 4;

pub const MAX_CONFIRM_TEXT: usize = 240;
pub const MAX_CONFIRM_ACTIONS: usize = 2;

pub const MAX_COLUMNS: usize = 5;
pub const MAX_COLUMN_ACTIONS: usize = 3;
pub const MAX_COLUMN_TEXT: usize = 120;
/// Column text limit once both a title and a thumbnail are shown.
pub const MAX_COLUMN_TEXT_WITH_HEADER: usize = 60;

pub const MAX_MESSAGES_PER_REPLY: usize = 5;

/// Length in characters.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn check_length(field: &'static str, value: &str, limit: usize) -> BuildResult<()> {
    let actual = char_len(value);
    if actual > limit {
        return Err(BuildError::TextTooLong {
            field,
            limit,
            actual,
        });
    }
    Ok(())
}

pub fn check_required(field: &'static str, value: &str) -> BuildResult<()> {
    if value.is_empty() {
        return Err(BuildError::missing(field));
    }
    Ok(())
}

/// The URL must parse and use `https`.
pub fn check_https(url: &str) -> BuildResult<()> {
    let parsed = Url::parse(url).map_err(|e| BuildError::invalid_url(url, e.to_string()))?;
    if parsed.scheme() != "https" {
        return Err(BuildError::invalid_url(
            url,
            format!("scheme must be https, got {}", parsed.scheme()),
        ));
    }
    Ok(())
}

/// Checks the label and payload limits of a template action.
pub fn validate_template_action(action: &TemplateAction) -> BuildResult<()> {
    match action {
        TemplateAction::Uri { label, .. } => check_length("label", label, MAX_ACTION_LABEL),
        TemplateAction::Message { label, text } => {
            check_length("label", label, MAX_ACTION_LABEL)?;
            check_length("text", text, MAX_ACTION_TEXT)
        }
        TemplateAction::Postback { label, data, text } => {
            check_length("label", label, MAX_ACTION_LABEL)?;
            if let Some(text) = text {
                check_length("text", text, MAX_ACTION_TEXT)?;
            }
            check_length("data", data, MAX_POSTBACK_DATA)
        }
    }
}

/// Checks the payload limits of an image map action.
pub fn validate_imagemap_action(action: &ImagemapAction) -> BuildResult<()> {
    match action {
        ImagemapAction::Message { text, .. } => check_length("text", text, MAX_IMAGEMAP_TEXT),
        ImagemapAction::Uri { link_uri, .. } => check_length("link_uri", link_uri, MAX_URI),
    }
}

pub fn validate_template_actions(actions: &[TemplateAction]) -> BuildResult<()> {
    actions.iter().try_for_each(validate_template_action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lynx_core::ImagemapArea;

    #[test]
    fn test_lengths_count_characters() {
        let label = "ありがとうございます。よろしくお願いします。";
        assert_eq!(char_len(label), 22);
        assert!(label.len() > 22);
        assert!(check_length("label", label, MAX_TITLE).is_ok());
        assert_eq!(
            check_length("label", label, MAX_ACTION_LABEL),
            Err(BuildError::TextTooLong {
                field: "label",
                limit: 20,
                actual: 22
            })
        );
    }

    #[test]
    fn test_check_https() {
        assert!(check_https("https://example.com/a.png").is_ok());
        assert!(matches!(
            check_https("http://example.com/a.png"),
            Err(BuildError::InvalidUrl { .. })
        ));
        assert!(matches!(
            check_https("not a url"),
            Err(BuildError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_template_action_limits() {
        assert!(validate_template_action(&TemplateAction::uri("x".repeat(20), "https://a")).is_ok());
        assert!(validate_template_action(&TemplateAction::uri("x".repeat(21), "https://a")).is_err());

        let postback = TemplateAction::postback("ok", "d".repeat(301), "");
        assert_eq!(
            validate_template_action(&postback),
            Err(BuildError::TextTooLong {
                field: "data",
                limit: 300,
                actual: 301
            })
        );

        let message = TemplateAction::message("ok", "t".repeat(300));
        assert!(validate_template_action(&message).is_ok());
    }

    #[test]
    fn test_imagemap_action_limits() {
        let area = ImagemapArea::new(0, 0, 10, 10);
        let ok = ImagemapAction::Message {
            text: "t".repeat(400),
            area,
        };
        let long = ImagemapAction::Uri {
            link_uri: format!("https://{}", "a".repeat(1000)),
            area,
        };
        assert!(validate_imagemap_action(&ok).is_ok());
        assert!(matches!(
            validate_imagemap_action(&long),
            Err(BuildError::TextTooLong {
                field: "link_uri",
                ..
            })
        ));
    }
}
