//! Action accumulation shared by every template builder.

use lynx_core::TemplateAction;

/// Ordered list of actions collected by a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionAccumulator {
    actions: Vec<TemplateAction>,
}

impl ActionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: TemplateAction) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn as_slice(&self) -> &[TemplateAction] {
        &self.actions
    }

    pub fn to_vec(&self) -> Vec<TemplateAction> {
        self.actions.clone()
    }
}

/// Builders that carry template actions.
///
/// Implementors only expose their accumulator; the fluent adders come for
/// free and keep insertion order.
///
/// ```rust,ignore
/// let confirm = ConfirmBuilder::new("Proceed?")
///     .message_action("Yes", "yes")
///     .message_action("No", "no")
///     .build("confirm")?;
/// ```
pub trait Actionable: Sized {
    fn actions_mut(&mut self) -> &mut ActionAccumulator;

    /// Appends a pre-built action.
    fn action(mut self, action: TemplateAction) -> Self {
        self.actions_mut().push(action);
        self
    }

    fn message_action(self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.action(TemplateAction::message(label, text))
    }

    fn uri_action(self, label: impl Into<String>, uri: impl Into<String>) -> Self {
        self.action(TemplateAction::uri(label, uri))
    }

    /// An empty `text` sends the postback silently.
    fn postback_action(
        self,
        label: impl Into<String>,
        data: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.action(TemplateAction::postback(label, data, text))
    }
}
