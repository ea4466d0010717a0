//! Pure numeric helpers shared by the grid, typography and accessibility code.
//!
//! Everything here is total: degenerate input (zero sizes, NaN, negative
//! values) produces degenerate but finite output rather than an error.

use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Shapes
// ────────────────────────────────────────────────────────────────────────────

/// Target drawing surface. Units are whatever the rendering backend uses
/// (slide points for the default configuration).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or 0 for a zero-height canvas.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        }
    }

    /// Fails unless both dimensions are finite and strictly positive.
    pub fn validate(&self, field: &str) -> Result<(), LayoutError> {
        check_positive(&format!("{field}.width"), self.width)?;
        check_positive(&format!("{field}.height"), self.height)
    }
}

/// Edge offsets in canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            top: self.top * factor,
            right: self.right * factor,
            bottom: self.bottom * factor,
            left: self.left * factor,
        }
    }

    /// Every edge passed through [`non_negative`].
    pub fn sanitized(&self) -> Self {
        Self {
            top: non_negative(self.top),
            right: non_negative(self.right),
            bottom: non_negative(self.bottom),
            left: non_negative(self.left),
        }
    }
}

/// Absolute rectangle on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Scaling
// ────────────────────────────────────────────────────────────────────────────

/// Uniform scale that fits `canvas` inside `reference` proportions:
/// `min(w / ref_w, h / ref_h)`. A degenerate reference yields 1.0.
pub fn scale_ratio(canvas: &CanvasSize, reference: &CanvasSize) -> f32 {
    if !(reference.width > 0.0 && reference.height > 0.0) {
        return 1.0;
    }
    let ratio = (canvas.width / reference.width).min(canvas.height / reference.height);
    if ratio.is_finite() {
        ratio
    } else {
        1.0
    }
}

/// Clamps `value` into `[min, max]`.
///
/// Unlike `f32::clamp` this never panics: an inverted band returns `max`,
/// and NaN collapses to `min`.
pub fn clamp_to_band(value: f32, min: f32, max: f32) -> f32 {
    if min > max {
        return max;
    }
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// NaN, infinities and negatives become 0.
pub fn non_negative(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub(crate) fn check_positive(field: &str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::invalid(
            field,
            format!("must be a finite number greater than 0, got {value}"),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Luminance (WCAG 2.x relative luminance)
// ────────────────────────────────────────────────────────────────────────────

const SRGB_LINEAR_THRESHOLD: f32 = 0.03928;

/// Converts one gamma-encoded sRGB channel in `[0, 1]` to linear light.
pub fn srgb_channel_to_linear(channel: f32) -> f32 {
    if channel <= SRGB_LINEAR_THRESHOLD {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of an 8-bit sRGB color, in `[0, 1]`.
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f32 {
    let lin = |c: u8| srgb_channel_to_linear(c as f32 / 255.0);
    0.2126 * lin(r) + 0.7152 * lin(g) + 0.0722 * lin(b)
}

/// `(lighter + 0.05) / (darker + 0.05)`; argument order does not matter.
pub fn contrast_from_luminance(a: f32, b: f32) -> f32 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    (hi + 0.05) / (lo + 0.05)
}
