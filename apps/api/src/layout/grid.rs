//! Grid system: column/row geometry and CSS-Grid-style named areas.
//!
//! Area strings use the `grid-area` shorthand order:
//! `"row-start / col-start / row-end / col-end"`, 1-indexed, end-exclusive.
//!
//! ```text
//!  margins.left          column_width   gutter
//!  |<-->|<------->|<->|<------->|<->|<------->|<-->|
//!       | col 1   |   | col 2   |   | col 3   |
//!       ^ line 1      ^ line 2      ^ line 3  ^ line 4
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::layout::geometry::{non_negative, CanvasSize, Margins, Rect};

/// Column counts beyond this are legal but unusual enough to warn about.
pub const MAX_RECOMMENDED_COLUMNS: i32 = 24;

/// Highest grid line an area string may name. Larger lines are malformed.
pub const MAX_GRID_LINE: u32 = u16::MAX as u32;

// ────────────────────────────────────────────────────────────────────────────
// Areas
// ────────────────────────────────────────────────────────────────────────────

/// A rectangle of grid cells. Lines are 1-indexed and the end lines are
/// exclusive, so `1 / 1 / 2 / 13` is the first row across a 12-column grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridArea {
    pub row_start: u32,
    pub col_start: u32,
    pub row_end: u32,
    pub col_end: u32,
}

impl GridArea {
    /// Returns `None` unless `row_end > row_start >= 1` and `col_end > col_start >= 1`.
    pub fn new(row_start: u32, col_start: u32, row_end: u32, col_end: u32) -> Option<Self> {
        let valid = row_start >= 1 && col_start >= 1 && row_end > row_start && col_end > col_start;
        valid.then_some(Self {
            row_start,
            col_start,
            row_end,
            col_end,
        })
    }

    pub fn row_span(&self) -> u32 {
        self.row_end - self.row_start
    }

    pub fn col_span(&self) -> u32 {
        self.col_end - self.col_start
    }
}

impl fmt::Display for GridArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.row_start, self.col_start, self.row_end, self.col_end
        )
    }
}

/// Parses one `"r1 / c1 / r2 / c2"` string. Anything but exactly four
/// unsigned integers up to [`MAX_GRID_LINE`] forming a valid [`GridArea`]
/// yields `None`.
pub fn parse_area(spec: &str) -> Option<GridArea> {
    let fields: Vec<&str> = spec.split('/').map(str::trim).collect();
    if fields.len() != 4 {
        return None;
    }
    let mut nums = [0u32; 4];
    for (slot, field) in nums.iter_mut().zip(&fields) {
        *slot = field.parse::<u32>().ok().filter(|line| *line <= MAX_GRID_LINE)?;
    }
    GridArea::new(nums[0], nums[1], nums[2], nums[3])
}

/// Caller-supplied area definitions, in declaration order.
///
/// Deserializes from a JSON object and keeps the document order of its keys;
/// that order is the reading-order contract used by redistribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaTemplate {
    entries: Vec<(String, String)>,
}

impl AreaTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. A repeated name replaces the earlier definition in place.
    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<String>) {
        let name = name.into();
        let spec = spec.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = spec,
            None => self.entries.push((name, spec)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, S: Into<String>> FromIterator<(N, S)> for AreaTemplate {
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        let mut template = AreaTemplate::new();
        for (name, spec) in iter {
            template.insert(name, spec);
        }
        template
    }
}

impl Serialize for AreaTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, spec) in &self.entries {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AreaTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TemplateVisitor;

        impl<'de> Visitor<'de> for TemplateVisitor {
            type Value = AreaTemplate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of area names to \"row-start / col-start / row-end / col-end\"")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut template = AreaTemplate::new();
                while let Some((name, spec)) = access.next_entry::<String, String>()? {
                    template.insert(name, spec);
                }
                Ok(template)
            }
        }

        deserializer.deserialize_map(TemplateVisitor)
    }
}

/// Parsed areas keyed by name, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaMap {
    entries: Vec<(String, GridArea)>,
}

impl AreaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, area: GridArea) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = area,
            None => self.entries.push((name, area)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&GridArea> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GridArea)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rows the areas occupy (highest end line − 1), 0 when empty.
    pub fn row_count(&self) -> u32 {
        self.entries
            .iter()
            .map(|(_, a)| a.row_end - 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of columns the areas occupy (highest end line − 1), 0 when empty.
    pub fn column_count(&self) -> u32 {
        self.entries
            .iter()
            .map(|(_, a)| a.col_end - 1)
            .max()
            .unwrap_or(0)
    }
}

impl Serialize for AreaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, area) in &self.entries {
            map.serialize_entry(name, area)?;
        }
        map.end()
    }
}

/// Parses every entry of `template`, silently dropping malformed ones.
pub fn parse_areas(template: Option<&AreaTemplate>) -> AreaMap {
    parse_areas_reporting(template).0
}

/// Like [`parse_areas`], but also returns the names of the dropped entries.
pub fn parse_areas_reporting(template: Option<&AreaTemplate>) -> (AreaMap, Vec<String>) {
    let mut areas = AreaMap::new();
    let mut rejected = Vec::new();
    let Some(template) = template else {
        return (areas, rejected);
    };

    for (name, spec) in template.iter() {
        match parse_area(spec) {
            Some(area) => areas.insert(name, area),
            None => rejected.push(name.to_string()),
        }
    }
    (areas, rejected)
}

// ────────────────────────────────────────────────────────────────────────────
// Grid descriptor
// ────────────────────────────────────────────────────────────────────────────

/// Resolved grid for one canvas. Built per layout request and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDescriptor {
    pub canvas: CanvasSize,
    pub columns: u32,
    pub gutter: f32,
    pub margins: Margins,
    pub content_width: f32,
    pub content_height: f32,
    pub column_width: f32,
}

/// Builds the grid descriptor for `canvas`.
///
/// `columns < 1` is treated as 1; negative or NaN gutter/margins as 0. A
/// canvas smaller than its margins yields zero-sized content, never negative.
pub fn create_grid(canvas: CanvasSize, columns: i32, gutter: f32, margins: Margins) -> GridDescriptor {
    let columns = columns.max(1) as u32;
    let gutter = non_negative(gutter);
    let margins = margins.sanitized();

    let content_width = non_negative(canvas.width - margins.left - margins.right);
    let content_height = non_negative(canvas.height - margins.top - margins.bottom);
    let column_width =
        non_negative((content_width - gutter * (columns - 1) as f32) / columns as f32);

    GridDescriptor {
        canvas,
        columns,
        gutter,
        margins,
        content_width,
        content_height,
        column_width,
    }
}

/// Horizontal extent of a column span, relative to the content box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpan {
    pub x: f32,
    pub width: f32,
    pub span_count: u32,
}

/// Vertical extent of a row span, relative to the content box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpan {
    pub y: f32,
    pub height: f32,
    pub span_count: u32,
}

pub fn resolve_column_span(start_col: u32, end_col: u32, column_width: f32, gutter: f32) -> ColumnSpan {
    let span_count = end_col.saturating_sub(start_col);
    let x = start_col.saturating_sub(1) as f32 * (column_width + gutter);
    let width = if span_count == 0 {
        0.0
    } else {
        column_width * span_count as f32 + gutter * (span_count - 1) as f32
    };
    ColumnSpan {
        x,
        width,
        span_count,
    }
}

/// Rows share `content_height` equally; there is no row gutter.
pub fn resolve_row_span(start_row: u32, end_row: u32, content_height: f32, total_rows: u32) -> RowSpan {
    let row_height = content_height / total_rows.max(1) as f32;
    let span_count = end_row.saturating_sub(start_row);
    RowSpan {
        y: start_row.saturating_sub(1) as f32 * row_height,
        height: row_height * span_count as f32,
        span_count,
    }
}

/// Absolute canvas rectangle covered by `area` on `grid` split into `total_rows` rows.
pub fn resolve_area(area: &GridArea, grid: &GridDescriptor, total_rows: u32) -> Rect {
    let cols = resolve_column_span(area.col_start, area.col_end, grid.column_width, grid.gutter);
    let rows = resolve_row_span(area.row_start, area.row_end, grid.content_height, total_rows);
    Rect {
        x: grid.margins.left + cols.x,
        y: grid.margins.top + rows.y,
        width: cols.width,
        height: rows.height,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// A grid configuration as a template author writes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub slide_dimensions: Option<CanvasSize>,
    pub columns: Option<i32>,
    #[serde(default)]
    pub gutter: f32,
    #[serde(default)]
    pub margins: Margins,
    pub areas: Option<AreaTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Checks a grid configuration without building anything.
///
/// Only a missing/degenerate slide size and malformed area strings are
/// errors; odd column counts and overflowing areas are warnings.
pub fn validate(config: &GridConfig) -> GridValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match &config.slide_dimensions {
        None => errors.push("slideDimensions is required".to_string()),
        Some(dims) => {
            if let Err(e) = dims.validate("slideDimensions") {
                errors.push(e.to_string());
            }
        }
    }

    if let Some(columns) = config.columns {
        if !(1..=MAX_RECOMMENDED_COLUMNS).contains(&columns) {
            warnings.push(format!(
                "columns = {columns} is outside the recommended range 1..={MAX_RECOMMENDED_COLUMNS}"
            ));
        }
    }

    if let Some(template) = &config.areas {
        for (name, spec) in template.iter() {
            match parse_area(spec) {
                None => errors.push(format!(
                    "area '{name}' has malformed definition '{spec}' \
                     (expected \"row-start / col-start / row-end / col-end\")"
                )),
                Some(area) => {
                    if let Some(columns) = config.columns.filter(|c| *c >= 1) {
                        if area.col_end > columns as u32 + 1 {
                            warnings.push(format!(
                                "area '{name}' ends at column line {} but the grid has only {columns} columns",
                                area.col_end
                            ));
                        }
                    }
                }
            }
        }
    }

    if let (Some(dims), Some(columns)) = (&config.slide_dimensions, config.columns) {
        let grid = create_grid(*dims, columns, config.gutter, config.margins);
        if grid.columns > 1 && grid.column_width <= 0.0 {
            warnings.push(format!(
                "gutter {} leaves no room for {} columns in a content width of {}",
                grid.gutter, grid.columns, grid.content_width
            ));
        }
    }

    GridValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hd_grid() -> GridDescriptor {
        create_grid(
            CanvasSize::new(1920.0, 1080.0),
            12,
            16.0,
            Margins::new(32.0, 42.0, 32.0, 42.0),
        )
    }

    #[test]
    fn test_create_grid_hd_twelve_columns() {
        let grid = hd_grid();
        assert!((grid.content_width - 1836.0).abs() < 1e-3);
        assert!((grid.content_height - 1016.0).abs() < 1e-3);
        let expected = (1836.0 - 176.0) / 12.0;
        assert!(
            (grid.column_width - expected).abs() < 1e-3,
            "column width should be ~138.33, got {}",
            grid.column_width
        );
    }

    #[test]
    fn test_create_grid_zero_columns_treated_as_one() {
        let grid = create_grid(CanvasSize::new(1000.0, 500.0), 0, 20.0, Margins::default());
        assert_eq!(grid.columns, 1);
        assert_eq!(grid.column_width, 1000.0);

        let grid = create_grid(CanvasSize::new(1000.0, 500.0), -4, 20.0, Margins::default());
        assert_eq!(grid.columns, 1);
    }

    #[test]
    fn test_create_grid_zero_canvas_is_degenerate_not_negative() {
        let grid = create_grid(
            CanvasSize::new(0.0, 0.0),
            12,
            16.0,
            Margins::new(32.0, 42.0, 32.0, 42.0),
        );
        assert_eq!(grid.content_width, 0.0);
        assert_eq!(grid.content_height, 0.0);
        assert_eq!(grid.column_width, 0.0);
        assert!(!grid.column_width.is_nan());
    }

    #[test]
    fn test_parse_areas_header() {
        let template: AreaTemplate = [("header", "1 / 1 / 2 / 13")].into_iter().collect();
        let areas = parse_areas(Some(&template));
        assert_eq!(areas.len(), 1);
        assert_eq!(areas.get("header"), Some(&GridArea::new(1, 1, 2, 13).unwrap()));
    }

    #[test]
    fn test_parse_areas_drops_wrong_arity() {
        let template: AreaTemplate = [("bad", "1 / 1 / 2")].into_iter().collect();
        assert!(parse_areas(Some(&template)).is_empty());
    }

    #[test]
    fn test_parse_areas_drops_malformed_keeps_rest() {
        let template: AreaTemplate = [
            ("header", "1/1/2/13"),
            ("empty", ""),
            ("words", "a / b / c / d"),
            ("inverted", "2 / 1 / 1 / 3"),
            ("zero", "0 / 1 / 2 / 3"),
            ("body", " 2 / 1 / 6 / 13 "),
        ]
        .into_iter()
        .collect();
        let (areas, rejected) = parse_areas_reporting(Some(&template));
        assert_eq!(areas.names().collect::<Vec<_>>(), vec!["header", "body"]);
        assert_eq!(rejected, vec!["empty", "words", "inverted", "zero"]);
    }

    #[test]
    fn test_parse_area_rejects_lines_past_max() {
        assert_eq!(parse_area("1 / 1 / 4294967295 / 13"), None);
        assert_eq!(parse_area("1 / 1 / 65536 / 13"), None);
        assert_eq!(
            parse_area("1 / 1 / 65535 / 13"),
            GridArea::new(1, 1, MAX_GRID_LINE, 13),
            "the highest allowed line still parses"
        );
    }

    #[test]
    fn test_parse_areas_absent_is_empty() {
        assert!(parse_areas(None).is_empty());
    }

    #[test]
    fn test_area_template_deserialize_keeps_document_order() {
        let template: AreaTemplate =
            serde_json::from_str(r#"{"zeta":"1/1/2/2","alpha":"2/1/3/2","mid":"3/1/4/2"}"#).unwrap();
        let names: Vec<&str> = template.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_resolve_area_full_width_header() {
        let grid = hd_grid();
        let area = GridArea::new(1, 1, 2, 13).unwrap();
        let rect = resolve_area(&area, &grid, 4);
        assert!((rect.x - 42.0).abs() < 1e-3);
        assert!((rect.y - 32.0).abs() < 1e-3);
        assert!((rect.width - grid.content_width).abs() < 1e-2, "12 columns + 11 gutters");
        assert!((rect.height - 254.0).abs() < 1e-3);
    }

    #[test]
    fn test_resolve_area_right_half() {
        let grid = hd_grid();
        let area = GridArea::new(2, 7, 4, 13).unwrap();
        let rect = resolve_area(&area, &grid, 4);
        let expected_x = 42.0 + 6.0 * (grid.column_width + 16.0);
        assert!((rect.x - expected_x).abs() < 1e-3);
        assert!((rect.y - (32.0 + 254.0)).abs() < 1e-3);
        assert!((rect.height - 508.0).abs() < 1e-3);
    }

    #[test]
    fn test_resolve_column_span_counts_internal_gutters() {
        let span = resolve_column_span(2, 5, 100.0, 10.0);
        assert_eq!(span.span_count, 3);
        assert_eq!(span.x, 110.0);
        assert_eq!(span.width, 320.0);
    }

    #[test]
    fn test_resolve_column_span_empty() {
        let span = resolve_column_span(4, 4, 100.0, 10.0);
        assert_eq!(span.span_count, 0);
        assert_eq!(span.width, 0.0);
    }

    #[test]
    fn test_resolve_row_span() {
        let span = resolve_row_span(2, 4, 900.0, 3);
        assert_eq!(span.span_count, 2);
        assert_eq!(span.y, 300.0);
        assert_eq!(span.height, 600.0);

        // zero rows → treated as one
        let span = resolve_row_span(1, 2, 900.0, 0);
        assert_eq!(span.height, 900.0);
    }

    #[test]
    fn test_area_map_extent() {
        let mut areas = AreaMap::new();
        areas.insert("a", GridArea::new(1, 1, 2, 13).unwrap());
        areas.insert("b", GridArea::new(2, 1, 6, 7).unwrap());
        assert_eq!(areas.row_count(), 5);
        assert_eq!(areas.column_count(), 12);
        assert_eq!(AreaMap::new().row_count(), 0);
    }

    #[test]
    fn test_validate_requires_slide_dimensions() {
        let result = validate(&GridConfig::default());
        assert!(!result.valid);
        assert!(result.errors[0].contains("slideDimensions"));
    }

    #[test]
    fn test_validate_large_column_count_is_warning() {
        let config = GridConfig {
            slide_dimensions: Some(CanvasSize::new(1920.0, 1080.0)),
            columns: Some(48),
            ..GridConfig::default()
        };
        let result = validate(&config);
        assert!(result.valid, "48 columns is a warning, not an error");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_validate_malformed_area_is_error() {
        let config = GridConfig {
            slide_dimensions: Some(CanvasSize::new(1920.0, 1080.0)),
            columns: Some(12),
            areas: Some([("bad", "1 / 2"), ("wide", "1 / 1 / 2 / 15")].into_iter().collect()),
            ..GridConfig::default()
        };
        let result = validate(&config);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("bad"));
        assert!(result.warnings.iter().any(|w| w.contains("wide")));
    }

    #[test]
    fn test_validate_gutter_consumes_content() {
        let config = GridConfig {
            slide_dimensions: Some(CanvasSize::new(100.0, 100.0)),
            columns: Some(6),
            gutter: 40.0,
            ..GridConfig::default()
        };
        let result = validate(&config);
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("gutter")));
    }

    proptest! {
        #[test]
        fn prop_create_grid_is_deterministic(
            w in 0.0f32..4000.0, h in 0.0f32..4000.0, cols in -2i32..30,
            gutter in 0.0f32..64.0, m in 0.0f32..100.0,
        ) {
            let margins = Margins::new(m, m, m, m);
            let a = create_grid(CanvasSize::new(w, h), cols, gutter, margins);
            let b = create_grid(CanvasSize::new(w, h), cols, gutter, margins);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_content_box_invariant(
            w in 400.0f32..4000.0, h in 400.0f32..4000.0,
            top in 0.0f32..100.0, right in 0.0f32..100.0,
            bottom in 0.0f32..100.0, left in 0.0f32..100.0,
        ) {
            let grid = create_grid(CanvasSize::new(w, h), 12, 16.0, Margins::new(top, right, bottom, left));
            prop_assert!((left + grid.content_width + right - w).abs() < 1e-2);
            prop_assert!((top + grid.content_height + bottom - h).abs() < 1e-2);
        }

        #[test]
        fn prop_column_width_positive(
            w in 200.0f32..4000.0, cols in 1i32..24, gutter in 0.0f32..8.0,
        ) {
            let grid = create_grid(CanvasSize::new(w, 600.0), cols, gutter, Margins::default());
            prop_assume!(grid.content_width > gutter * (cols - 1) as f32);
            prop_assert!(grid.column_width > 0.0);
        }
    }
}
