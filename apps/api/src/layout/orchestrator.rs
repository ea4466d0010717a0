//! Layout orchestration: the single entry point external collaborators call.
//!
//! # Pipeline
//! 1. Validate the canvas and convert content specs into typed items.
//! 2. Classify the canvas (responsive requests only) and derive scaling factors.
//! 3. Pick the column count and layout type from the request's intent.
//! 4. Parse the area template; redistribute it when the grid is too narrow.
//! 5. Adapt content for small canvases.
//! 6. Place items (named areas first, then auto-placed rows) and resolve geometry.
//! 7. Solve font size / line height, apply theme color, estimate overflow.
//!
//! Only invalid required input fails the call. Everything else becomes a
//! warning on the result.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::LayoutError;
use crate::layout::accessibility::{validate_theme, Theme, ThemeReport};
use crate::layout::content::{ContentItem, ContentItemSpec, PositionedElement};
use crate::layout::geometry::CanvasSize;
use crate::layout::grid::{
    create_grid, parse_areas_reporting, resolve_area, AreaMap, AreaTemplate, GridArea, GridDescriptor,
};
use crate::layout::options::LayoutOptions;
use crate::layout::responsive::{
    classify, optimal_layout_type, optimize_content, redistribute_areas, scaling_factors, Breakpoint,
    BreakpointKind, LayoutType, ScalingFactors,
};
use crate::layout::text_metrics::SANS_METRICS;
use crate::layout::typography::{
    line_height, responsive_font_size, ContentRole, FontSizeRequest, ViewingDistance,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / result
// ────────────────────────────────────────────────────────────────────────────

/// `columns` on the wire: a number, `"auto"`, or a layout type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnsSpec {
    Count(i64),
    Keyword(String),
}

impl Default for ColumnsSpec {
    fn default() -> Self {
        ColumnsSpec::Keyword("auto".to_string())
    }
}

/// How the caller wants columns chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutIntent {
    Columns(u32),
    Auto,
    Named(LayoutType),
}

impl ColumnsSpec {
    /// Counts below 1 become 1; an unknown keyword fails.
    pub fn intent(&self) -> Result<LayoutIntent, LayoutError> {
        match self {
            ColumnsSpec::Count(n) => Ok(LayoutIntent::Columns((*n).clamp(1, u32::MAX as i64) as u32)),
            ColumnsSpec::Keyword(k) if k.trim().eq_ignore_ascii_case("auto") => Ok(LayoutIntent::Auto),
            ColumnsSpec::Keyword(k) => k.parse::<LayoutType>().map(LayoutIntent::Named),
        }
    }
}

fn default_responsive() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub canvas: CanvasSize,
    #[serde(default)]
    pub columns: ColumnsSpec,
    pub template: Option<AreaTemplate>,
    #[serde(default)]
    pub content: Vec<ContentItemSpec>,
    #[serde(default = "default_responsive")]
    pub responsive: bool,
    #[serde(default)]
    pub viewing_distance: ViewingDistance,
    pub theme: Option<Theme>,
    /// Forces a breakpoint by key instead of classifying the canvas.
    pub breakpoint: Option<String>,
}

impl LayoutRequest {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            columns: ColumnsSpec::default(),
            template: None,
            content: Vec::new(),
            responsive: true,
            viewing_distance: ViewingDistance::Medium,
            theme: None,
            breakpoint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub positioned_elements: Vec<PositionedElement>,
    pub grid: GridDescriptor,
    pub breakpoint: Option<Breakpoint>,
    pub scaling: ScalingFactors,
    pub layout_type: LayoutType,
    /// Areas as finally used, after any redistribution.
    pub areas: AreaMap,
    pub total_rows: u32,
    pub accessibility: Option<ThemeReport>,
    pub warnings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Computes final geometry and style for every content item.
///
/// Fails only for a degenerate canvas, an unsupported role or layout type,
/// or an item with no body. Malformed areas, unknown area names, unknown
/// breakpoint keys and failing theme colors are reported in `warnings`.
pub fn compute_layout(request: &LayoutRequest, options: &LayoutOptions) -> Result<LayoutResult, LayoutError> {
    request.canvas.validate("canvas")?;
    let intent = request.columns.intent()?;
    let items = request
        .content
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, spec)| ContentItem::from_spec(spec, index))
        .collect::<Result<Vec<_>, _>>()?;

    let mut warnings = Vec::new();
    if let ColumnsSpec::Count(n) = request.columns {
        if n < 1 {
            warnings.push(format!("columns = {n} is below 1; using a single column"));
        }
    }

    // ── Breakpoint and scaling ──────────────────────────────────────────────
    let table = &options.breakpoint_thresholds;
    let breakpoint = if request.responsive {
        let bp = match &request.breakpoint {
            Some(key) => {
                let (bp, known) = table.lookup(key);
                if !known {
                    warnings.push(format!("unknown breakpoint '{key}'; using md"));
                }
                *bp
            }
            None => classify(request.canvas.width, request.canvas.height, table).breakpoint,
        };
        debug!(breakpoint = %bp.kind, width = request.canvas.width, "canvas classified");
        Some(bp)
    } else {
        None
    };

    let scaling = match &breakpoint {
        Some(bp) => scaling_factors(bp, &request.canvas, &options.reference_canvas),
        None => ScalingFactors::uniform_only(&request.canvas, &options.reference_canvas),
    };

    let items = match &breakpoint {
        Some(bp) if bp.kind.is_small() => optimize_content(&items, bp.kind),
        _ => items,
    };

    // ── Areas and columns ───────────────────────────────────────────────────
    let (mut areas, rejected) = parse_areas_reporting(request.template.as_ref());
    for name in rejected {
        warnings.push(format!("area '{name}' has a malformed definition and was dropped"));
    }

    let mut placed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let has_area = match item.area.as_deref() {
            Some(name) if areas.get(name).is_some() => true,
            Some(name) => {
                warnings.push(format!(
                    "content[{index}] refers to unknown area '{name}'; placing it automatically"
                ));
                false
            }
            None => false,
        };
        placed.push(has_area);
    }

    let flow_count = items
        .iter()
        .zip(&placed)
        .filter(|(item, has_area)| !**has_area && item.role != ContentRole::Title)
        .count();
    let flow_kind = breakpoint.map(|bp| bp.kind).unwrap_or(BreakpointKind::Lg);
    let layout_type = match intent {
        LayoutIntent::Named(t) => t,
        _ => optimal_layout_type(flow_count, flow_kind),
    };

    let mut columns = match intent {
        LayoutIntent::Columns(n) => n,
        LayoutIntent::Auto if !areas.is_empty() => areas.column_count(),
        _ => layout_type.columns(),
    };
    if let Some(bp) = &breakpoint {
        columns = columns.min(bp.columns);
    }

    let template_columns = areas.column_count();
    if template_columns > columns {
        if columns <= 2 {
            areas = redistribute_areas(&areas, columns);
        } else {
            warnings.push(format!(
                "template spans {template_columns} columns but only {columns} fit; keeping the authored geometry"
            ));
            columns = template_columns;
        }
    }

    let grid = create_grid(
        request.canvas,
        columns.min(i32::MAX as u32) as i32,
        options.base_gutter * scaling.spacing,
        options.base_margins.scaled(scaling.margins),
    );

    // ── Placement ───────────────────────────────────────────────────────────
    let per_row = layout_type.items_per_row().min(grid.columns).max(1);
    let mut flow = AutoFlow::new(areas.row_count(), grid.columns, per_row);
    let assignments: Vec<(GridArea, Option<String>)> = items
        .iter()
        .zip(&placed)
        .map(|(item, has_area)| {
            let named = item
                .area
                .as_deref()
                .filter(|_| *has_area)
                .and_then(|name| areas.get(name).map(|a| (*a, name.to_string())));
            match named {
                Some((area, name)) => (area, Some(name)),
                None if item.role == ContentRole::Title => (flow.full_row(), None),
                None => (flow.next_slot(), None),
            }
        })
        .collect();
    let total_rows = flow.total_rows().max(areas.row_count()).max(1);

    // ── Style ───────────────────────────────────────────────────────────────
    let accessibility = request
        .theme
        .as_ref()
        .map(|theme| validate_theme(theme, options.accessibility_level));
    let text_color = match (&request.theme, &accessibility) {
        (Some(theme), Some(report)) => match report.suggestion_for("text") {
            Some(replacement) => {
                warnings.push(format!(
                    "theme text color {} fails {} contrast on {}; using {replacement}",
                    theme.text, options.accessibility_level, theme.background
                ));
                Some(replacement.to_string())
            }
            None => Some(theme.text.clone()),
        },
        _ => None,
    };

    let font_multiplier = breakpoint.map(|bp| bp.font_size_multiplier).unwrap_or(1.0);
    let roles = &options.font_role_bands;
    let mut positioned_elements = Vec::with_capacity(items.len());

    for (index, (item, (area, area_name))) in items.into_iter().zip(assignments).enumerate() {
        let position = resolve_area(&area, &grid, total_rows);
        let font_request = FontSizeRequest {
            base_size: roles.band(item.role).base * font_multiplier * item.font_scale,
            canvas: request.canvas,
            content_length: item.content_length(),
            viewing_distance: request.viewing_distance,
            importance: item.importance,
            role: item.role,
        };
        let font_size = responsive_font_size(&font_request, &options.typography_reference, roles)?;
        let leading = line_height(font_size, item.role, roles, options.min_line_height_ratio);

        if position.width > 0.0 {
            let needed =
                SANS_METRICS.estimate_height(&item.display_text(), font_size, leading, position.width);
            if needed > position.height + 0.5 {
                warnings.push(format!(
                    "content[{index}] ({}) needs about {needed:.0} of height but its area is {:.0}; it may overflow",
                    item.role, position.height
                ));
            }
        }

        positioned_elements.push(PositionedElement {
            bold: item.role.is_bold(),
            item,
            position,
            font_size,
            line_height: leading,
            color: text_color.clone(),
            area: area_name,
        });
    }

    if !warnings.is_empty() {
        warn!(
            warnings = warnings.len(),
            elements = positioned_elements.len(),
            "Layout computed with warnings"
        );
    }

    Ok(LayoutResult {
        positioned_elements,
        grid,
        breakpoint,
        scaling,
        layout_type,
        areas,
        total_rows,
        accessibility,
        warnings,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Auto-placement
// ────────────────────────────────────────────────────────────────────────────

/// Row-major cursor for items without a named area. Rows start below the template.
/// Line arithmetic saturates at `u32::MAX`.
struct AutoFlow {
    next_row: u32,
    columns: u32,
    per_row: u32,
    slot: u32,
}

impl AutoFlow {
    fn new(template_rows: u32, columns: u32, per_row: u32) -> Self {
        Self {
            next_row: template_rows.saturating_add(1),
            columns: columns.max(1),
            per_row: per_row.clamp(1, columns.max(1)),
            slot: 0,
        }
    }

    /// A full-width row of its own, closing any partly filled row first.
    fn full_row(&mut self) -> GridArea {
        self.close_row();
        let area = self.area(1, self.columns.saturating_add(1));
        self.advance_row();
        area
    }

    /// Next slot in the current row; the last slot absorbs leftover columns.
    fn next_slot(&mut self) -> GridArea {
        let share = self.columns / self.per_row;
        let start = self.slot * share + 1;
        let end = if self.slot + 1 == self.per_row {
            self.columns.saturating_add(1)
        } else {
            start + share
        };
        let area = self.area(start, end);
        self.slot += 1;
        if self.slot == self.per_row {
            self.slot = 0;
            self.advance_row();
        }
        area
    }

    fn close_row(&mut self) {
        if self.slot > 0 {
            self.slot = 0;
            self.advance_row();
        }
    }

    fn advance_row(&mut self) {
        self.next_row = self.next_row.saturating_add(1);
    }

    /// Last row line in use.
    fn total_rows(&self) -> u32 {
        if self.slot > 0 {
            self.next_row
        } else {
            self.next_row.saturating_sub(1)
        }
    }

    fn area(&self, col_start: u32, col_end: u32) -> GridArea {
        GridArea {
            row_start: self.next_row,
            col_start,
            row_end: self.next_row.saturating_add(1),
            col_end,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
