//! Carousel template builder.

use lynx_core::{CarouselColumn, Message, Template};
use serde::Serialize;

use crate::action::{ActionAccumulator, Actionable};
use crate::button::non_empty;
use crate::error::{BuildError, BuildResult};
use crate::template::{ColumnTemplate, RecordFailure};
use crate::validate::{
    MAX_COLUMN_ACTIONS, MAX_COLUMN_TEXT, MAX_COLUMN_TEXT_WITH_HEADER, MAX_COLUMNS, MAX_TITLE,
    MAX_URI, check_length, check_required, validate_template_actions,
};

/// One column of a carousel under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBuilder {
    thumbnail_image_url: Option<String>,
    title: Option<String>,
    text: String,
    actions: ActionAccumulator,
}

impl ColumnBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

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

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    fn validate(&self, expected_actions: usize, column: usize) -> BuildResult<()> {
        let actual = self.actions.len();
        if actual > MAX_COLUMN_ACTIONS {
            return Err(BuildError::TooManyActions {
                limit: MAX_COLUMN_ACTIONS,
                actual,
            });
        }
        if actual != expected_actions {
            return Err(BuildError::ActionCountInconsistent {
                column,
                expected: expected_actions,
                actual,
            });
        }
        validate_template_actions(self.actions.as_slice())?;

        if let Some(url) = &self.thumbnail_image_url {
            check_length("thumbnail_image_url", url, MAX_URI)?;
        }
        if let Some(title) = &self.title {
            check_length("title", title, MAX_TITLE)?;
        }
        check_required("text", &self.text)?;

        let text_limit = if self.title.is_some() && self.thumbnail_image_url.is_some() {
            MAX_COLUMN_TEXT_WITH_HEADER
        } else {
            MAX_COLUMN_TEXT
        };
        check_length("text", &self.text, text_limit)
    }

    fn to_column(&self) -> CarouselColumn {
        CarouselColumn {
            thumbnail_image_url: self.thumbnail_image_url.clone(),
            title: self.title.clone(),
            text: self.text.clone(),
            actions: self.actions.to_vec(),
        }
    }
}

impl Actionable for ColumnBuilder {
    fn actions_mut(&mut self) -> &mut ActionAccumulator {
        &mut self.actions
    }
}

/// Accumulates carousel columns, by hand or from a [`ColumnTemplate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarouselBuilder {
    columns: Vec<ColumnBuilder>,
    template: Option<ColumnTemplate>,
}

impl CarouselBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    pub fn column(mut self, column: ColumnBuilder) -> Self {
        self.columns.push(column);
        self
    }

    pub fn add_column(&mut self, column: ColumnBuilder) {
        self.columns.push(column);
    }

    /// Sets the template used by [`generate_columns`](Self::generate_columns).
    pub fn with_template(mut self, template: ColumnTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn columns(&self) -> &[ColumnBuilder] {
        &self.columns
    }

    /// Renders the configured template against `records` and appends one
    /// column per record that rendered.
    ///
    /// Returns the records that failed, which are otherwise skipped.
    pub fn generate_columns<T: Serialize>(
        &mut self,
        records: &[T],
    ) -> BuildResult<Vec<RecordFailure>> {
        let template = self.template.as_ref().ok_or(BuildError::NoColumnTemplate)?;
        let generated = template.generate(records)?;
        self.columns.extend(generated.columns);
        Ok(generated.failures)
    }

    pub fn build(&self, alt_text: impl Into<String>) -> BuildResult<Message> {
        if self.columns.len() > MAX_COLUMNS {
            return Err(BuildError::TooManyColumns {
                limit: MAX_COLUMNS,
                actual: self.columns.len(),
            });
        }
        let Some(first) = self.columns.first() else {
            return Err(BuildError::missing("columns"));
        };

        let expected_actions = first.action_count();
        for (index, column) in self.columns.iter().enumerate() {
            column.validate(expected_actions, index)?;
        }

        Ok(Message::Template {
            alt_text: alt_text.into(),
            template: Template::Carousel {
                columns: self.columns.iter().map(ColumnBuilder::to_column).collect(),
            },
        })
    }
}
