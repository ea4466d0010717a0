//! Breakpoints, proportional scaling and small-canvas adaptation.
//!
//! # Classification
//! Width alone picks the breakpoint; the ladder below is total, so every
//! width ≥ 0 lands in exactly one bucket:
//!
//! ```text
//!   w ≤ xs.max → xs
//!   w ≤ sm.max → sm
//!   w ≤ md.max → md
//!   w ≤ lg.max → lg
//!   otherwise  → xl
//! ```
//! NaN or negative widths fall back to `md`.
//!
//! # Redistribution
//! On one- or two-column targets, named areas are re-flowed so that a reader
//! scanning top-to-bottom meets them in declaration order. Three or more
//! columns keep the authored geometry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;
use crate::layout::content::{ContentBody, ContentItem};
use crate::layout::geometry::{scale_ratio, CanvasSize};
use crate::layout::grid::{AreaMap, GridArea};

/// Texts longer than this are shortened on small canvases.
pub const MAX_SMALL_CANVAS_CHARS: usize = 150;
/// Truncation keeps at most this share of the limit before the ellipsis.
const TRUNCATION_SHARE: f32 = 0.8;
/// Small canvases raise every item's font scale to at least this.
pub const SMALL_CANVAS_FONT_SCALE: f32 = 1.2;
const ELLIPSIS: char = '…';

// ────────────────────────────────────────────────────────────────────────────
// Breakpoints
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakpointKind {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl BreakpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakpointKind::Xs => "xs",
            BreakpointKind::Sm => "sm",
            BreakpointKind::Md => "md",
            BreakpointKind::Lg => "lg",
            BreakpointKind::Xl => "xl",
        }
    }

    pub fn is_small(&self) -> bool {
        matches!(self, BreakpointKind::Xs | BreakpointKind::Sm)
    }
}

impl fmt::Display for BreakpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakpointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xs" => Ok(BreakpointKind::Xs),
            "sm" => Ok(BreakpointKind::Sm),
            "md" => Ok(BreakpointKind::Md),
            "lg" => Ok(BreakpointKind::Lg),
            "xl" => Ok(BreakpointKind::Xl),
            other => Err(format!("unknown breakpoint '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDensity {
    Low,
    Medium,
    High,
}

impl ContentDensity {
    pub fn factor(&self) -> f32 {
        match self {
            ContentDensity::Low => 0.7,
            ContentDensity::Medium => 1.0,
            ContentDensity::High => 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub kind: BreakpointKind,
    /// Max width for xs–lg, min width for xl.
    pub threshold: f32,
    pub columns: u32,
    pub font_size_multiplier: f32,
    pub spacing_multiplier: f32,
    pub margin_multiplier: f32,
    pub density: ContentDensity,
}

impl Breakpoint {
    const fn new(
        kind: BreakpointKind,
        threshold: f32,
        columns: u32,
        font: f32,
        spacing: f32,
        margins: f32,
        density: ContentDensity,
    ) -> Self {
        Self {
            kind,
            threshold,
            columns,
            font_size_multiplier: font,
            spacing_multiplier: spacing,
            margin_multiplier: margins,
            density,
        }
    }
}

/// The five breakpoints, ordered by width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakpointTable {
    pub xs: Breakpoint,
    pub sm: Breakpoint,
    pub md: Breakpoint,
    pub lg: Breakpoint,
    pub xl: Breakpoint,
}

impl Default for BreakpointTable {
    fn default() -> Self {
        use BreakpointKind::*;
        use ContentDensity::*;
        Self {
            xs: Breakpoint::new(Xs, 480.0, 1, 0.8, 0.6, 0.5, Low),
            sm: Breakpoint::new(Sm, 768.0, 2, 0.9, 0.75, 0.7, Low),
            md: Breakpoint::new(Md, 1024.0, 8, 1.0, 1.0, 1.0, Medium),
            lg: Breakpoint::new(Lg, 1440.0, 12, 1.0, 1.0, 1.0, Medium),
            xl: Breakpoint::new(Xl, 1441.0, 12, 1.1, 1.2, 1.2, High),
        }
    }
}

impl BreakpointTable {
    pub fn get(&self, kind: BreakpointKind) -> &Breakpoint {
        match kind {
            BreakpointKind::Xs => &self.xs,
            BreakpointKind::Sm => &self.sm,
            BreakpointKind::Md => &self.md,
            BreakpointKind::Lg => &self.lg,
            BreakpointKind::Xl => &self.xl,
        }
    }

    /// Looks a breakpoint up by key; unknown keys resolve to `md`.
    /// The flag is `false` when the fallback was used.
    pub fn lookup(&self, key: &str) -> (&Breakpoint, bool) {
        match key.parse::<BreakpointKind>() {
            Ok(kind) => (self.get(kind), true),
            Err(_) => (&self.md, false),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        [&self.xs, &self.sm, &self.md, &self.lg, &self.xl].into_iter()
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let ladder = [&self.xs, &self.sm, &self.md, &self.lg, &self.xl];
        for (bp, expected) in ladder.iter().zip([
            BreakpointKind::Xs,
            BreakpointKind::Sm,
            BreakpointKind::Md,
            BreakpointKind::Lg,
            BreakpointKind::Xl,
        ]) {
            if bp.kind != expected {
                return Err(LayoutError::InvalidOptions(format!(
                    "breakpoint in slot '{expected}' is labelled '{}'",
                    bp.kind
                )));
            }
            let multipliers = [bp.font_size_multiplier, bp.spacing_multiplier, bp.margin_multiplier];
            if multipliers.iter().any(|m| !(m.is_finite() && *m > 0.0)) {
                return Err(LayoutError::InvalidOptions(format!(
                    "breakpoint '{}' multipliers must be greater than 0",
                    bp.kind
                )));
            }
            if bp.columns < 1 {
                return Err(LayoutError::InvalidOptions(format!(
                    "breakpoint '{}' must have at least one column",
                    bp.kind
                )));
            }
        }
        for pair in ladder.windows(2) {
            if !(pair[0].threshold < pair[1].threshold) {
                return Err(LayoutError::InvalidOptions(format!(
                    "breakpoint thresholds must increase: {} ({}) is not below {} ({})",
                    pair[0].kind, pair[0].threshold, pair[1].kind, pair[1].threshold
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub breakpoint: Breakpoint,
    /// Informational only; never affects the breakpoint.
    pub aspect_ratio: f32,
}

pub fn classify(width: f32, height: f32, table: &BreakpointTable) -> Classification {
    let breakpoint = if width.is_nan() || width < 0.0 {
        table.md
    } else if width <= table.xs.threshold {
        table.xs
    } else if width <= table.sm.threshold {
        table.sm
    } else if width <= table.md.threshold {
        table.md
    } else if width <= table.lg.threshold {
        table.lg
    } else {
        table.xl
    };
    Classification {
        breakpoint,
        aspect_ratio: CanvasSize::new(width, height).aspect_ratio(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scaling
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingFactors {
    pub font_size: f32,
    pub spacing: f32,
    pub margins: f32,
    pub uniform: f32,
    pub content_density: f32,
}

impl ScalingFactors {
    /// Plain proportional scaling with no breakpoint adjustments.
    pub fn uniform_only(canvas: &CanvasSize, reference: &CanvasSize) -> Self {
        let uniform = scale_ratio(canvas, reference);
        Self {
            font_size: uniform,
            spacing: uniform,
            margins: uniform,
            uniform,
            content_density: ContentDensity::Medium.factor(),
        }
    }
}

pub fn scaling_factors(breakpoint: &Breakpoint, canvas: &CanvasSize, reference: &CanvasSize) -> ScalingFactors {
    let uniform = scale_ratio(canvas, reference);
    ScalingFactors {
        font_size: breakpoint.font_size_multiplier * uniform,
        spacing: breakpoint.spacing_multiplier * uniform,
        margins: breakpoint.margin_multiplier * uniform,
        uniform,
        content_density: breakpoint.density.factor(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Area redistribution
// ────────────────────────────────────────────────────────────────────────────

/// Re-flows areas for a narrower grid.
///
/// `target_columns >= 3` returns the areas unchanged. For 1 column every area
/// gets its own full-width row; for 2 columns areas fill rows left-to-right.
/// In both cases row-major order equals the map's insertion order.
pub fn redistribute_areas(areas: &AreaMap, target_columns: u32) -> AreaMap {
    if target_columns >= 3 {
        return areas.clone();
    }
    let per_row = target_columns.max(1);
    let mut out = AreaMap::new();
    for (index, (name, _)) in areas.iter().enumerate() {
        let index = index as u32;
        let row = index / per_row + 1;
        let col = index % per_row + 1;
        if let Some(area) = GridArea::new(row, col, row + 1, col + 1) {
            out.insert(name, area);
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Content optimization
// ────────────────────────────────────────────────────────────────────────────

/// Adapts content for small canvases: larger type, shorter text, tables as lists.
///
/// Returns new items; md and wider get an unchanged copy. Idempotent.
pub fn optimize_content(items: &[ContentItem], breakpoint: BreakpointKind) -> Vec<ContentItem> {
    if !breakpoint.is_small() {
        return items.to_vec();
    }
    items
        .iter()
        .map(|item| {
            let mut optimized = item.clone();
            optimized.font_scale = optimized.font_scale.max(SMALL_CANVAS_FONT_SCALE);
            let text = match &item.body {
                ContentBody::Text(text) => text.clone(),
                ContentBody::Table(table) => table.to_line_list(),
            };
            let text = truncate_at_word(&text).unwrap_or(text);
            optimized.body = ContentBody::Text(text);
            optimized
        })
        .collect()
}

/// Shortens text over [`MAX_SMALL_CANVAS_CHARS`] at the last word boundary
/// within 80% of the limit. `None` if no truncation is needed.
pub fn truncate_at_word(text: &str) -> Option<String> {
    if text.chars().count() <= MAX_SMALL_CANVAS_CHARS {
        return None;
    }
    let limit = (MAX_SMALL_CANVAS_CHARS as f32 * TRUNCATION_SHARE) as usize;

    // One extra char so a space right at the limit still counts as a boundary.
    let head_end = text
        .char_indices()
        .nth(limit + 1)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..head_end];

    let boundary = head
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .last()
        .filter(|i| *i > 0);
    let cut = boundary.unwrap_or_else(|| {
        text.char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    });

    Some(format!("{}{ELLIPSIS}", text[..cut].trim_end()))
}

// ────────────────────────────────────────────────────────────────────────────
// Layout types
// ────────────────────────────────────────────────────────────────────────────

/// Named column arrangement used for auto-placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    SingleColumn,
    TwoColumn,
    ThreeColumn,
    FourColumn,
    #[serde(rename = "grid-2x2")]
    Grid2x2,
    #[serde(rename = "grid-3x2")]
    Grid3x2,
}

impl LayoutType {
    pub const ALL: [LayoutType; 6] = [
        LayoutType::SingleColumn,
        LayoutType::TwoColumn,
        LayoutType::ThreeColumn,
        LayoutType::FourColumn,
        LayoutType::Grid2x2,
        LayoutType::Grid3x2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::SingleColumn => "single-column",
            LayoutType::TwoColumn => "two-column",
            LayoutType::ThreeColumn => "three-column",
            LayoutType::FourColumn => "four-column",
            LayoutType::Grid2x2 => "grid-2x2",
            LayoutType::Grid3x2 => "grid-3x2",
        }
    }

    /// Grid columns this arrangement is built on.
    pub fn columns(&self) -> u32 {
        self.items_per_row()
    }

    pub fn items_per_row(&self) -> u32 {
        match self {
            LayoutType::SingleColumn => 1,
            LayoutType::TwoColumn | LayoutType::Grid2x2 => 2,
            LayoutType::ThreeColumn | LayoutType::Grid3x2 => 3,
            LayoutType::FourColumn => 4,
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        LayoutType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| LayoutError::UnsupportedLayoutType(s.to_string()))
    }
}

/// Deterministic choice of arrangement for `item_count` items.
///
/// | bp \ items | 0–1    | 2   | 3     | 4     | 5+     |
/// |------------|--------|-----|-------|-------|--------|
/// | xs         | single | single | single | single | single |
/// | sm         | single | two | single | 2x2 | single |
/// | md         | single | two | three | 2x2 | 2x2 |
/// | lg         | single | two | three | 2x2 | 3x2 |
/// | xl         | single | two | three | four | 3x2 |
pub fn optimal_layout_type(item_count: usize, breakpoint: BreakpointKind) -> LayoutType {
    use BreakpointKind::*;
    use LayoutType::*;

    match (breakpoint, item_count) {
        (_, 0..=1) | (Xs, _) => SingleColumn,
        (_, 2) => TwoColumn,
        (Sm, 3) => SingleColumn,
        (_, 3) => ThreeColumn,
        (Xl, 4) => FourColumn,
        (_, 4) => Grid2x2,
        (Sm, _) => SingleColumn,
        (Md, _) => Grid2x2,
        (Lg | Xl, _) => Grid3x2,
    }
}
