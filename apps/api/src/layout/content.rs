use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;
use crate::layout::geometry::Rect;
use crate::layout::typography::{ContentRole, Importance};

/// Prefix of the header line when a table is flattened into text.
pub const TABLE_HEADER_PREFIX: &str = "▸ ";
/// Prefix of each data line when a table is flattened into text.
pub const TABLE_ROW_PREFIX: &str = "• ";
const CELL_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableContent {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl TableContent {
    /// One line per table row; the header line is marked differently from data lines.
    pub fn to_line_list(&self) -> String {
        let header = (!self.headers.is_empty())
            .then(|| format!("{TABLE_HEADER_PREFIX}{}", self.headers.join(CELL_SEPARATOR)));
        let rows = self
            .rows
            .iter()
            .map(|row| format!("{TABLE_ROW_PREFIX}{}", row.join(CELL_SEPARATOR)));
        header.into_iter().chain(rows).collect::<Vec<_>>().join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBody {
    Text(String),
    Table(TableContent),
}

/// One unit of slide content after boundary validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub role: ContentRole,
    pub body: ContentBody,
    pub importance: Importance,
    pub area: Option<String>,
    /// Multiplier applied to the role's base size (≥ 1 after small-canvas optimization).
    pub font_scale: f32,
}

impl ContentItem {
    pub fn text(role: ContentRole, text: impl Into<String>) -> Self {
        Self {
            role,
            body: ContentBody::Text(text.into()),
            importance: Importance::Medium,
            area: None,
            font_scale: 1.0,
        }
    }

    pub fn table(role: ContentRole, table: TableContent) -> Self {
        Self {
            role,
            body: ContentBody::Table(table),
            importance: Importance::Medium,
            area: None,
            font_scale: 1.0,
        }
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn in_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    /// Text as it would be rendered; tables are flattened to a line list.
    pub fn display_text(&self) -> String {
        match &self.body {
            ContentBody::Text(text) => text.clone(),
            ContentBody::Table(table) => table.to_line_list(),
        }
    }

    /// Character count of [`Self::display_text`].
    pub fn content_length(&self) -> usize {
        match &self.body {
            ContentBody::Text(text) => text.chars().count(),
            ContentBody::Table(table) => table.to_line_list().chars().count(),
        }
    }

    /// Validates the wire form. `index` is only used to name the failing field.
    pub fn from_spec(spec: ContentItemSpec, index: usize) -> Result<Self, LayoutError> {
        let role = spec.role.parse::<ContentRole>()?;
        let body = match (spec.text, spec.table) {
            (Some(_), Some(_)) => {
                return Err(LayoutError::invalid(
                    format!("content[{index}]"),
                    "an item carries either text or table, not both",
                ))
            }
            (Some(text), None) => ContentBody::Text(text),
            (None, Some(table)) => ContentBody::Table(table),
            (None, None) => {
                return Err(LayoutError::invalid(
                    format!("content[{index}].text"),
                    "text or table is required",
                ))
            }
        };
        let font_scale = match spec.font_scale {
            None => 1.0,
            Some(scale) if scale.is_finite() && scale > 0.0 => scale,
            Some(scale) => {
                return Err(LayoutError::invalid(
                    format!("content[{index}].fontScale"),
                    format!("must be greater than 0, got {scale}"),
                ))
            }
        };
        Ok(Self {
            role,
            body,
            importance: spec.importance,
            area: spec.area.filter(|a| !a.trim().is_empty()),
            font_scale,
        })
    }
}

/// Content item as received on the wire; the role stays a string until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItemSpec {
    #[serde(rename = "type")]
    pub role: String,
    pub text: Option<String>,
    pub table: Option<TableContent>,
    #[serde(default)]
    pub importance: Importance,
    pub area: Option<String>,
    pub font_scale: Option<f32>,
}

/// Final geometry and style for one item, ready for a rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedElement {
    pub item: ContentItem,
    pub position: Rect,
    pub font_size: f32,
    pub line_height: f32,
    pub bold: bool,
    pub color: Option<String>,
    pub area: Option<String>,
}
