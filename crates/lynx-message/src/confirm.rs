//! Confirm template builder.

use lynx_core::{Message, Template};

use crate::action::{ActionAccumulator, Actionable};
use crate::error::{BuildError, BuildResult};
use crate::validate::{
    MAX_CONFIRM_ACTIONS, MAX_CONFIRM_TEXT, check_length, check_required,
    validate_template_actions,
};

/// Accumulates a confirm template: a question and at most two answers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfirmBuilder {
    text: String,
    actions: ActionAccumulator,
}

impl ConfirmBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: ActionAccumulator::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn build(&self, alt_text: impl Into<String>) -> BuildResult<Message> {
        check_required("text", &self.text)?;
        check_length("text", &self.text, MAX_CONFIRM_TEXT)?;
        if self.actions.len() > MAX_CONFIRM_ACTIONS {
            return Err(BuildError::TooManyActions {
                limit: MAX_CONFIRM_ACTIONS,
                actual: self.actions.len(),
            });
        }
        validate_template_actions(self.actions.as_slice())?;

        Ok(Message::Template {
            alt_text: alt_text.into(),
            template: Template::Confirm {
                text: self.text.clone(),
                actions: self.actions.to_vec(),
            },
        })
    }
}

impl Actionable for ConfirmBuilder {
    fn actions_mut(&mut self) -> &mut ActionAccumulator {
        &mut self.actions
    }
}
