//! Font-size and line-height solver.
//!
//! The solver scales a role's base size to the canvas, nudges it for content
//! length, viewing distance and importance, then clamps it into the role's
//! band and lifts it to the role's accessibility floor. Sizes are in points.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;
use crate::layout::geometry::{check_positive, clamp_to_band, scale_ratio, CanvasSize};

// ────────────────────────────────────────────────────────────────────────────
// Roles and hints
// ────────────────────────────────────────────────────────────────────────────

/// Semantic category of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    Title,
    Heading,
    Subheading,
    Body,
    Caption,
    Footnote,
}

impl ContentRole {
    pub const ALL: [ContentRole; 6] = [
        ContentRole::Title,
        ContentRole::Heading,
        ContentRole::Subheading,
        ContentRole::Body,
        ContentRole::Caption,
        ContentRole::Footnote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRole::Title => "title",
            ContentRole::Heading => "heading",
            ContentRole::Subheading => "subheading",
            ContentRole::Body => "body",
            ContentRole::Caption => "caption",
            ContentRole::Footnote => "footnote",
        }
    }

    /// Display roles are rendered bold.
    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            ContentRole::Title | ContentRole::Heading | ContentRole::Subheading
        )
    }
}

impl fmt::Display for ContentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentRole {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ContentRole::ALL
            .into_iter()
            .find(|r| r.as_str() == needle)
            .ok_or_else(|| LayoutError::UnsupportedRole(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
}

impl Importance {
    pub fn factor(&self) -> f32 {
        match self {
            Importance::Low => 0.9,
            Importance::Medium => 1.0,
            Importance::High => 1.15,
        }
    }
}

/// How far the audience sits from the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewingDistance {
    Close,
    #[default]
    Medium,
    Far,
}

impl ViewingDistance {
    pub fn factor(&self) -> f32 {
        match self {
            ViewingDistance::Close => 0.9,
            ViewingDistance::Medium => 1.0,
            ViewingDistance::Far => 1.3,
        }
    }
}

/// Longer text gets slightly smaller type so it still fits.
pub fn content_length_factor(content_length: usize) -> f32 {
    match content_length {
        0..=50 => 1.0,
        51..=150 => 0.95,
        151..=300 => 0.85,
        _ => 0.75,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Role bands
// ────────────────────────────────────────────────────────────────────────────

/// Size band and leading for one role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBand {
    pub min: f32,
    pub max: f32,
    /// Size at the typography reference canvas before any adjustment.
    pub base: f32,
    pub line_height_ratio: f32,
    /// Smallest size this role may ever render at.
    pub accessibility_floor: f32,
}

impl RoleBand {
    const fn new(min: f32, max: f32, base: f32, line_height_ratio: f32, floor: f32) -> Self {
        Self {
            min,
            max,
            base,
            line_height_ratio,
            accessibility_floor: floor,
        }
    }

    /// Lowest size the solver can return for this band.
    pub fn effective_min(&self) -> f32 {
        self.min.max(self.accessibility_floor).min(self.max)
    }
}

/// Per-role bands. Brand configurations override individual entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontRoleTable {
    pub title: RoleBand,
    pub heading: RoleBand,
    pub subheading: RoleBand,
    pub body: RoleBand,
    pub caption: RoleBand,
    pub footnote: RoleBand,
}

impl Default for FontRoleTable {
    fn default() -> Self {
        Self {
            title: RoleBand::new(36.0, 60.0, 44.0, 1.2, 24.0),
            heading: RoleBand::new(28.0, 40.0, 32.0, 1.25, 20.0),
            subheading: RoleBand::new(24.0, 32.0, 28.0, 1.3, 18.0),
            body: RoleBand::new(20.0, 28.0, 24.0, 1.5, 16.0),
            caption: RoleBand::new(18.0, 24.0, 20.0, 1.4, 14.0),
            footnote: RoleBand::new(14.0, 18.0, 16.0, 1.4, 12.0),
        }
    }
}

impl FontRoleTable {
    pub fn band(&self, role: ContentRole) -> &RoleBand {
        match role {
            ContentRole::Title => &self.title,
            ContentRole::Heading => &self.heading,
            ContentRole::Subheading => &self.subheading,
            ContentRole::Body => &self.body,
            ContentRole::Caption => &self.caption,
            ContentRole::Footnote => &self.footnote,
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        for role in ContentRole::ALL {
            let band = self.band(role);
            let sizes = [band.min, band.max, band.base, band.line_height_ratio];
            if sizes.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
                return Err(LayoutError::InvalidOptions(format!(
                    "font band '{role}' must have positive min, max, base and line height ratio"
                )));
            }
            if band.min > band.max {
                return Err(LayoutError::InvalidOptions(format!(
                    "font band '{role}' has min {} greater than max {}",
                    band.min, band.max
                )));
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Solver
// ────────────────────────────────────────────────────────────────────────────

/// Input to [`responsive_font_size`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSizeRequest {
    pub base_size: f32,
    pub canvas: CanvasSize,
    #[serde(default)]
    pub content_length: usize,
    #[serde(default)]
    pub viewing_distance: ViewingDistance,
    #[serde(default)]
    pub importance: Importance,
    pub role: ContentRole,
}

impl FontSizeRequest {
    /// Request at the role's default base size with neutral hints.
    pub fn for_role(role: ContentRole, canvas: CanvasSize, roles: &FontRoleTable) -> Self {
        Self {
            base_size: roles.band(role).base,
            canvas,
            content_length: 0,
            viewing_distance: ViewingDistance::Medium,
            importance: Importance::Medium,
            role,
        }
    }
}

/// Computes the font size for one content unit.
///
/// Fails with `InvalidArgument` when `base_size` or either canvas dimension
/// is missing (non-finite) or not positive. The result always lies in
/// `[band.effective_min(), band.max]`.
pub fn responsive_font_size(
    request: &FontSizeRequest,
    reference: &CanvasSize,
    roles: &FontRoleTable,
) -> Result<f32, LayoutError> {
    check_positive("baseSize", request.base_size)?;
    request.canvas.validate("canvas")?;

    let scale = scale_ratio(&request.canvas, reference);
    let raw = request.base_size
        * scale
        * content_length_factor(request.content_length)
        * request.viewing_distance.factor()
        * request.importance.factor();

    let band = roles.band(request.role);
    let clamped = clamp_to_band(raw, band.min, band.max);
    Ok(clamped.max(band.effective_min()))
}

/// Leading for `font_size`: the role ratio, with an extra 0.1 below 20pt,
/// never below `min_ratio × font_size`.
pub fn line_height(font_size: f32, role: ContentRole, roles: &FontRoleTable, min_ratio: f32) -> f32 {
    let mut ratio = roles.band(role).line_height_ratio;
    if font_size < 20.0 {
        ratio += 0.1;
    }
    (ratio * font_size).max(min_ratio * font_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SLIDE_REF: CanvasSize = CanvasSize::new(960.0, 540.0);

    fn request(base_size: f32, canvas: CanvasSize, role: ContentRole) -> FontSizeRequest {
        FontSizeRequest {
            base_size,
            canvas,
            content_length: 0,
            viewing_distance: ViewingDistance::Medium,
            importance: Importance::Medium,
            role,
        }
    }

    #[test]
    fn test_body_on_hd_canvas_clamps_to_band_max() {
        // scale 2.0 → raw 48 → body max 28
        let size = responsive_font_size(
            &request(24.0, CanvasSize::new(1920.0, 1080.0), ContentRole::Body),
            &SLIDE_REF,
            &FontRoleTable::default(),
        )
        .unwrap();
        assert_eq!(size, 28.0);
    }

    #[test]
    fn test_reference_canvas_keeps_base_size() {
        let size = responsive_font_size(
            &request(24.0, SLIDE_REF, ContentRole::Body),
            &SLIDE_REF,
            &FontRoleTable::default(),
        )
        .unwrap();
        assert!((size - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_small_canvas_clamps_to_band_min() {
        let size = responsive_font_size(
            &request(24.0, CanvasSize::new(320.0, 180.0), ContentRole::Body),
            &SLIDE_REF,
            &FontRoleTable::default(),
        )
        .unwrap();
        assert_eq!(size, 20.0);
    }

    #[test]
    fn test_floor_raises_above_band_min() {
        let mut roles = FontRoleTable::default();
        roles.caption.accessibility_floor = 21.0;
        let size = responsive_font_size(
            &request(10.0, SLIDE_REF, ContentRole::Caption),
            &SLIDE_REF,
            &roles,
        )
        .unwrap();
        assert_eq!(size, 21.0, "floor should lift the clamped size");
    }

    #[test]
    fn test_hints_multiply() {
        let mut req = request(24.0, SLIDE_REF, ContentRole::Body);
        req.content_length = 200; // 0.85
        req.viewing_distance = ViewingDistance::Far; // 1.3
        req.importance = Importance::Low; // 0.9
        let size = responsive_font_size(&req, &SLIDE_REF, &FontRoleTable::default()).unwrap();
        let expected = 24.0 * 0.85 * 1.3 * 0.9;
        assert!((size - expected).abs() < 1e-3, "expected {expected}, got {size}");
    }

    #[test]
    fn test_invalid_base_size_fails() {
        let err = responsive_font_size(
            &request(0.0, SLIDE_REF, ContentRole::Body),
            &SLIDE_REF,
            &FontRoleTable::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidArgument { ref field, .. } if field == "baseSize"));
    }

    #[test]
    fn test_invalid_canvas_fails() {
        let err = responsive_font_size(
            &request(24.0, CanvasSize::new(f32::NAN, 540.0), ContentRole::Body),
            &SLIDE_REF,
            &FontRoleTable::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidArgument { ref field, .. } if field == "canvas.width"));
    }

    #[test]
    fn test_content_length_steps() {
        assert_eq!(content_length_factor(0), 1.0);
        assert_eq!(content_length_factor(50), 1.0);
        assert_eq!(content_length_factor(51), 0.95);
        assert_eq!(content_length_factor(150), 0.95);
        assert_eq!(content_length_factor(300), 0.85);
        assert_eq!(content_length_factor(301), 0.75);
    }

    #[test]
    fn test_line_height_small_text_gets_extra_leading() {
        let roles = FontRoleTable::default();
        let lh = line_height(16.0, ContentRole::Footnote, &roles, 1.2);
        assert!((lh - 16.0 * 1.5).abs() < 1e-4, "1.4 + 0.1 bump, got {lh}");

        let lh = line_height(40.0, ContentRole::Title, &roles, 1.2);
        assert!((lh - 48.0).abs() < 1e-4);
    }

    #[test]
    fn test_line_height_respects_minimum_ratio() {
        let roles = FontRoleTable::default();
        let lh = line_height(40.0, ContentRole::Title, &roles, 1.5);
        assert!((lh - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Heading".parse::<ContentRole>().unwrap(), ContentRole::Heading);
        let err = "banner".parse::<ContentRole>().unwrap_err();
        assert_eq!(err, LayoutError::UnsupportedRole("banner".into()));
    }

    #[test]
    fn test_role_table_rejects_inverted_band() {
        let mut roles = FontRoleTable::default();
        roles.body.min = 40.0;
        assert!(matches!(roles.validate(), Err(LayoutError::InvalidOptions(_))));
        assert!(FontRoleTable::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_font_size_stays_in_band(
            base in 1.0f32..200.0,
            w in 10.0f32..8000.0,
            h in 10.0f32..8000.0,
            len in 0usize..1000,
            role_idx in 0usize..6,
            floor in 0.0f32..80.0,
        ) {
            let role = ContentRole::ALL[role_idx];
            let mut roles = FontRoleTable::default();
            let band = match role {
                ContentRole::Title => &mut roles.title,
                ContentRole::Heading => &mut roles.heading,
                ContentRole::Subheading => &mut roles.subheading,
                ContentRole::Body => &mut roles.body,
                ContentRole::Caption => &mut roles.caption,
                ContentRole::Footnote => &mut roles.footnote,
            };
            band.accessibility_floor = floor;
            let band = *band;

            let mut req = request(base, CanvasSize::new(w, h), role);
            req.content_length = len;
            let size = responsive_font_size(&req, &SLIDE_REF, &roles).unwrap();
            prop_assert!(size >= band.min.max(floor).min(band.max) - 1e-4);
            prop_assert!(size <= band.max + 1e-4);
        }
    }
}
