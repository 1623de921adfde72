//! Column templates for generating carousel columns from records.
//!
//! Every sub-template is a string with `{{path}}` placeholders. A record is
//! serialized with serde and each placeholder is replaced by the value at
//! `path`:
//!
//! - `{{name}}` or `{{.name}}` reads a top-level field
//! - `{{owner.name}}` walks nested objects, `{{tags.0}}` indexes arrays
//! - `{{.}}` is the whole record
//!
//! Strings are inserted verbatim, numbers and booleans in their display form,
//! `null` as nothing, arrays and objects as JSON.
//!
//! ```rust,ignore
//! #[derive(Serialize)]
//! struct Item { index: u32, name: String }
//!
//! let template = ColumnTemplate::new()
//!     .title("{{name}}")
//!     .text("Item #{{index}}")
//!     .postback_action("Order", "order={{index}}", "");
//!
//! let generated = template.generate(&items)?;
//! ```

use lynx_core::TemplateAction;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::action::{ActionAccumulator, Actionable};
use crate::carousel::ColumnBuilder;
use crate::error::{BuildError, BuildResult};

/// Templates for the parts of a carousel column.
///
/// Parts left unconfigured render as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTemplate {
    thumbnail_image_url: Option<String>,
    title: Option<String>,
    text: Option<String>,
    actions: ActionAccumulator,
}

/// A record that produced no column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Position of the record in the input.
    pub index: usize,
    pub error: BuildError,
}

/// Outcome of rendering a batch of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generated {
    /// One column per successfully rendered record, in input order.
    pub columns: Vec<ColumnBuilder>,
    pub failures: Vec<RecordFailure>,
}

impl Generated {
    /// Whether every record produced a column.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ColumnTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thumbnail(mut self, template: impl Into<String>) -> Self {
        self.thumbnail_image_url = Some(template.into());
        self
    }

    pub fn title(mut self, template: impl Into<String>) -> Self {
        self.title = Some(template.into());
        self
    }

    pub fn text(mut self, template: impl Into<String>) -> Self {
        self.text = Some(template.into());
        self
    }

    /// Renders one column for `record`.
    pub fn render<T: Serialize>(&self, record: &T) -> BuildResult<ColumnBuilder> {
        let record = serde_json::to_value(record)
            .map_err(|e| BuildError::render("record", e.to_string()))?;
        self.render_value(&record)
    }

    /// Renders one column per record, skipping records that fail.
    ///
    /// Failures are collected with their index; they never abort the batch.
    pub fn generate<T: Serialize>(&self, records: &[T]) -> BuildResult<Generated> {
        if records.is_empty() {
            return Err(BuildError::missing("records"));
        }

        let mut generated = Generated::default();
        for (index, record) in records.iter().enumerate() {
            match self.render(record) {
                Ok(column) => generated.columns.push(column),
                Err(error) => {
                    warn!(index, error = %error, "Skipping record that failed to render");
                    generated.failures.push(RecordFailure { index, error });
                }
            }
        }

        debug!(
            columns = generated.columns.len(),
            failures = generated.failures.len(),
            "Generated carousel columns"
        );
        Ok(generated)
    }

    fn render_value(&self, record: &Value) -> BuildResult<ColumnBuilder> {
        let mut column = ColumnBuilder::new(render_optional("text", &self.text, record)?);
        if let Some(title) = &self.title {
            column = column.title(render_str("title", title, record)?);
        }
        if let Some(url) = &self.thumbnail_image_url {
            column = column.thumbnail(render_str("thumbnail_image_url", url, record)?);
        }
        for action in self.actions.as_slice() {
            column = column.action(render_action(action, record)?);
        }
        Ok(column)
    }
}

impl Actionable for ColumnTemplate {
    fn actions_mut(&mut self) -> &mut ActionAccumulator {
        &mut self.actions
    }
}

fn render_optional(field: &'static str, template: &Option<String>, record: &Value) -> BuildResult<String> {
    match template {
        Some(template) => render_str(field, template, record),
        None => Ok(String::new()),
    }
}

fn render_action(action: &TemplateAction, record: &Value) -> BuildResult<TemplateAction> {
    Ok(match action {
        TemplateAction::Message { label, text } => TemplateAction::Message {
            label: render_str("label", label, record)?,
            text: render_str("text", text, record)?,
        },
        TemplateAction::Uri { label, uri } => TemplateAction::Uri {
            label: render_str("label", label, record)?,
            uri: render_str("uri", uri, record)?,
        },
        TemplateAction::Postback { label, data, text } => TemplateAction::Postback {
            label: render_str("label", label, record)?,
            data: render_str("data", data, record)?,
            text: text
                .as_deref()
                .map(|text| render_str("text", text, record))
                .transpose()?,
        },
    })
}

/// Substitutes every `{{path}}` in `template` with the value it names.
pub fn render_str(field: &'static str, template: &str, record: &Value) -> BuildResult<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| BuildError::render(field, "unterminated placeholder"))?;

        let path = after[..end].trim();
        let value = lookup(record, path)
            .ok_or_else(|| BuildError::render(field, format!("no value at `{path}`")))?;
        push_value(&mut rendered, value);

        rest = &after[end + 2..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(record);
    }
    path.split('.').try_fold(record, |value, key| match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => {}
        // Arrays and objects keep their JSON representation
        _ => out.push_str(&value.to_string()),
    }
}
