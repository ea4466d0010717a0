//! Engine configuration.
//!
//! One immutable value, built at startup (or per request from a JSON
//! override) and passed by reference into every entry point. Layout calls
//! only ever read it.

use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;
use crate::layout::accessibility::WcagLevel;
use crate::layout::geometry::{CanvasSize, Margins};
use crate::layout::responsive::BreakpointTable;
use crate::layout::typography::FontRoleTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Canvas at which spacing and margin multipliers equal 1.
    pub reference_canvas: CanvasSize,
    /// Canvas at which role base sizes apply unscaled (a 16:9 slide at 96 dpi).
    pub typography_reference: CanvasSize,
    pub breakpoint_thresholds: BreakpointTable,
    pub font_role_bands: FontRoleTable,
    pub accessibility_level: WcagLevel,
    /// Gutter at the reference canvas before spacing multipliers.
    pub base_gutter: f32,
    /// Margins at the reference canvas before margin multipliers.
    pub base_margins: Margins,
    pub min_line_height_ratio: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            reference_canvas: CanvasSize::new(1920.0, 1080.0),
            typography_reference: CanvasSize::new(960.0, 540.0),
            breakpoint_thresholds: BreakpointTable::default(),
            font_role_bands: FontRoleTable::default(),
            accessibility_level: WcagLevel::Aa,
            base_gutter: 16.0,
            base_margins: Margins::new(32.0, 42.0, 32.0, 42.0),
            min_line_height_ratio: 1.2,
        }
    }
}

impl LayoutOptions {
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.reference_canvas
            .validate("referenceCanvas")
            .map_err(|e| LayoutError::InvalidOptions(e.to_string()))?;
        self.typography_reference
            .validate("typographyReference")
            .map_err(|e| LayoutError::InvalidOptions(e.to_string()))?;
        self.breakpoint_thresholds.validate()?;
        self.font_role_bands.validate()?;

        let margins = self.base_margins;
        let spacing = [
            self.base_gutter,
            margins.top,
            margins.right,
            margins.bottom,
            margins.left,
        ];
        if spacing.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(LayoutError::InvalidOptions(
                "baseGutter and baseMargins must be non-negative".to_string(),
            ));
        }
        if !(self.min_line_height_ratio.is_finite() && self.min_line_height_ratio > 0.0) {
            return Err(LayoutError::InvalidOptions(format!(
                "minLineHeightRatio must be greater than 0, got {}",
                self.min_line_height_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LayoutOptions::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_override_keeps_other_defaults() {
        let options: LayoutOptions =
            serde_json::from_str(r#"{"accessibilityLevel":"AAA","baseGutter":24}"#).unwrap();
        assert_eq!(options.accessibility_level, WcagLevel::Aaa);
        assert_eq!(options.base_gutter, 24.0);
        assert_eq!(options.reference_canvas, CanvasSize::new(1920.0, 1080.0));
        assert_eq!(options.font_role_bands, FontRoleTable::default());
    }

    #[test]
    fn test_band_override() {
        let options: LayoutOptions = serde_json::from_str(
            r#"{"fontRoleBands":{"body":{"min":22,"max":30,"base":26,"lineHeightRatio":1.4,"accessibilityFloor":18}}}"#,
        )
        .unwrap();
        assert_eq!(options.font_role_bands.body.min, 22.0);
        assert_eq!(options.font_role_bands.title, FontRoleTable::default().title);
    }

    #[test]
    fn test_zero_reference_is_rejected() {
        let options = LayoutOptions {
            reference_canvas: CanvasSize::new(0.0, 1080.0),
            ..LayoutOptions::default()
        };
        assert!(matches!(options.validate(), Err(LayoutError::InvalidOptions(_))));
    }

    #[test]
    fn test_negative_gutter_is_rejected() {
        let options = LayoutOptions {
            base_gutter: -1.0,
            ..LayoutOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
