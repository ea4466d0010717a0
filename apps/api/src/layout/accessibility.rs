//! WCAG 2.x contrast checks for text/background color pairs.
//!
//! # Thresholds
//! | level | normal text | large text |
//! |-------|-------------|------------|
//! | AA    | 4.5         | 3.0        |
//! | AAA   | 7.0         | 4.5        |
//!
//! Large text is ≥ 18pt, or ≥ 14pt when bold.
//!
//! Malformed colors never raise: the check simply does not pass.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use csscolorparser::Color;
use serde::{Deserialize, Serialize};

use crate::layout::geometry::{contrast_from_luminance, relative_luminance};

const LARGE_TEXT_PT: f32 = 18.0;
const LARGE_BOLD_TEXT_PT: f32 = 14.0;

/// Candidate text colors, tried in order.
const TEXT_CANDIDATES: [&str; 5] = ["#000000", "#FFFFFF", "#333333", "#666666", "#999999"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    #[default]
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA")]
    Aaa,
}

impl WcagLevel {
    /// Minimum contrast ratio for this level.
    pub fn required_ratio(&self, large_text: bool) -> f32 {
        match (self, large_text) {
            (WcagLevel::Aa, false) => 4.5,
            (WcagLevel::Aa, true) => 3.0,
            (WcagLevel::Aaa, false) => 7.0,
            (WcagLevel::Aaa, true) => 4.5,
        }
    }
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WcagLevel::Aa => f.write_str("AA"),
            WcagLevel::Aaa => f.write_str("AAA"),
        }
    }
}

impl FromStr for WcagLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AA" => Ok(WcagLevel::Aa),
            "AAA" => Ok(WcagLevel::Aaa),
            other => Err(format!("unknown WCAG level '{other}' (expected AA or AAA)")),
        }
    }
}

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn luminance(&self) -> f32 {
        relative_luminance(self.r, self.g, self.b)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parses any CSS color syntax; alpha is ignored.
pub fn parse_color(input: &str) -> Option<Rgb> {
    let parsed: Color = input.trim().parse().ok()?;
    let [r, g, b, _] = parsed.to_rgba8();
    Some(Rgb { r, g, b })
}

/// Relative luminance in `[0, 1]`, or `None` for an unparseable color.
pub fn luminance(color: &str) -> Option<f32> {
    parse_color(color).map(|c| c.luminance())
}

/// Contrast ratio in `[1, 21]`; symmetric in its arguments.
pub fn contrast_ratio(a: &Rgb, b: &Rgb) -> f32 {
    contrast_from_luminance(a.luminance(), b.luminance())
}

/// Contrast ratio of two color strings, `None` if either fails to parse.
pub fn contrast_ratio_str(a: &str, b: &str) -> Option<f32> {
    Some(contrast_ratio(&parse_color(a)?, &parse_color(b)?))
}

pub fn is_large_text(font_size_pt: f32, bold: bool) -> bool {
    font_size_pt >= LARGE_TEXT_PT || (bold && font_size_pt >= LARGE_BOLD_TEXT_PT)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastCheck {
    pub passes: bool,
    /// `None` when either color could not be parsed.
    pub ratio: Option<f32>,
    pub required: f32,
    pub level: WcagLevel,
    pub large_text: bool,
}

pub fn validate(foreground: &str, background: &str, level: WcagLevel, large_text: bool) -> ContrastCheck {
    let required = level.required_ratio(large_text);
    let ratio = contrast_ratio_str(foreground, background);
    ContrastCheck {
        passes: ratio.is_some_and(|r| r >= required),
        ratio,
        required,
        level,
        large_text,
    }
}

/// Picks a readable normal-size text color for `background`.
///
/// Tries the fixed candidate palette first; if none passes, falls back to
/// black on light backgrounds and white on dark ones.
pub fn find_accessible_text_color(background: &str, level: WcagLevel) -> &'static str {
    if let Some(candidate) = TEXT_CANDIDATES
        .into_iter()
        .find(|c| validate(c, background, level, false).passes)
    {
        return candidate;
    }
    match luminance(background) {
        Some(l) if l <= 0.5 => "#FFFFFF",
        _ => "#000000",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Theme validation
// ────────────────────────────────────────────────────────────────────────────

/// Colors a theme-management collaborator applies to a deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub text: String,
    pub background: String,
    /// Named accent colors used as text (success, warning, link, ...).
    #[serde(default)]
    pub semantic_colors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColorCheck {
    pub name: String,
    pub foreground: String,
    pub background: String,
    pub result: ContrastCheck,
    /// Replacement color when the check fails.
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeReport {
    pub passes: bool,
    pub level: WcagLevel,
    pub checks: Vec<ThemeColorCheck>,
    pub recommendations: Vec<String>,
}

impl ThemeReport {
    /// Suggested replacement for the named check, if it failed.
    pub fn suggestion_for(&self, name: &str) -> Option<&str> {
        self.checks
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.suggestion.as_deref())
    }
}

/// Checks the theme's text color and every semantic color against its background.
pub fn validate_theme(theme: &Theme, level: WcagLevel) -> ThemeReport {
    let mut checks = Vec::with_capacity(1 + theme.semantic_colors.len());
    let mut recommendations = Vec::new();

    let pairs = std::iter::once(("text", theme.text.as_str())).chain(
        theme
            .semantic_colors
            .iter()
            .map(|(name, color)| (name.as_str(), color.as_str())),
    );

    for (name, foreground) in pairs {
        let result = validate(foreground, &theme.background, level, false);
        let suggestion = if result.passes {
            None
        } else {
            let replacement = find_accessible_text_color(&theme.background, level);
            recommendations.push(recommend(name, foreground, &theme.background, &result, replacement));
            Some(replacement.to_string())
        };
        checks.push(ThemeColorCheck {
            name: name.to_string(),
            foreground: foreground.to_string(),
            background: theme.background.clone(),
            result,
            suggestion,
        });
    }

    ThemeReport {
        passes: checks.iter().all(|c| c.result.passes),
        level,
        checks,
        recommendations,
    }
}

fn recommend(name: &str, fg: &str, bg: &str, result: &ContrastCheck, replacement: &str) -> String {
    match result.ratio {
        Some(ratio) => format!(
            "'{name}' color {fg} on {bg} has contrast {ratio:.2}:1 but {} requires {:.1}:1; use {replacement} instead",
            result.level, result.required
        ),
        None => format!(
            "'{name}' color {fg} or background {bg} is not a valid color; use {replacement} on this background"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_black_on_white_is_21() {
        let ratio = contrast_ratio_str("#000000", "#ffffff").unwrap();
        assert!((ratio - 21.0).abs() < 1e-3, "got {ratio}");
    }

    #[test]
    fn test_black_on_white_passes_aa() {
        let check = validate("#000000", "#ffffff", WcagLevel::Aa, false);
        assert!(check.passes);
        assert_eq!(check.required, 4.5);
    }

    #[test]
    fn test_required_ratios() {
        assert_eq!(WcagLevel::Aa.required_ratio(false), 4.5);
        assert_eq!(WcagLevel::Aa.required_ratio(true), 3.0);
        assert_eq!(WcagLevel::Aaa.required_ratio(false), 7.0);
        assert_eq!(WcagLevel::Aaa.required_ratio(true), 4.5);
    }

    #[test]
    fn test_large_text_lowers_the_bar() {
        // #777777 on white is ~4.48:1; fails AA normal, passes AA large.
        assert!(!validate("#777777", "#ffffff", WcagLevel::Aa, false).passes);
        assert!(validate("#777777", "#ffffff", WcagLevel::Aa, true).passes);
    }

    #[test]
    fn test_is_large_text() {
        assert!(is_large_text(18.0, false));
        assert!(!is_large_text(17.9, false));
        assert!(is_large_text(14.0, true));
        assert!(!is_large_text(13.5, true));
    }

    #[test]
    fn test_malformed_color_does_not_pass() {
        let check = validate("#zzzzzz", "#ffffff", WcagLevel::Aa, false);
        assert!(!check.passes);
        assert_eq!(check.ratio, None);
        assert_eq!(luminance("not a color"), None);
    }

    #[test]
    fn test_named_and_short_hex_colors_parse() {
        assert_eq!(parse_color("white"), Some(Rgb { r: 255, g: 255, b: 255 }));
        assert_eq!(parse_color("#f00"), Some(Rgb { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn test_find_text_color_prefers_black_on_light() {
        assert_eq!(find_accessible_text_color("#ffffff", WcagLevel::Aa), "#000000");
    }

    #[test]
    fn test_find_text_color_white_on_dark() {
        assert_eq!(find_accessible_text_color("#101010", WcagLevel::Aaa), "#FFFFFF");
    }

    #[test]
    fn test_find_text_color_fallback_when_nothing_passes() {
        // Mid grey: neither black (~5.3) nor white (~4.0) reaches AAA 7.0.
        let bg = "#808080";
        assert!(TEXT_CANDIDATES
            .iter()
            .all(|c| !validate(c, bg, WcagLevel::Aaa, false).passes));
        let l = luminance(bg).unwrap();
        let expected = if l > 0.5 { "#000000" } else { "#FFFFFF" };
        assert_eq!(find_accessible_text_color(bg, WcagLevel::Aaa), expected);
    }

    #[test]
    fn test_theme_report_flags_weak_semantic_color() {
        let theme = Theme {
            text: "#222222".into(),
            background: "#ffffff".into(),
            semantic_colors: [
                ("success".to_string(), "#9be39b".to_string()),
                ("link".to_string(), "#0645ad".to_string()),
            ]
            .into_iter()
            .collect(),
        };
        let report = validate_theme(&theme, WcagLevel::Aa);
        assert!(!report.passes);
        assert_eq!(report.checks.len(), 3);
        assert_eq!(report.suggestion_for("success"), Some("#000000"));
        assert_eq!(report.suggestion_for("link"), None);
        assert_eq!(report.suggestion_for("text"), None);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("success"));
    }

    #[test]
    fn test_theme_report_malformed_background() {
        let theme = Theme {
            text: "#000000".into(),
            background: "bogus".into(),
            semantic_colors: BTreeMap::new(),
        };
        let report = validate_theme(&theme, WcagLevel::Aa);
        assert!(!report.passes);
        assert!(report.recommendations[0].contains("not a valid color"));
    }

    #[test]
    fn test_wcag_level_serde() {
        assert_eq!(serde_json::to_string(&WcagLevel::Aaa).unwrap(), "\"AAA\"");
        let level: WcagLevel = serde_json::from_str("\"AA\"").unwrap();
        assert_eq!(level, WcagLevel::Aa);
        assert_eq!("aaa".parse::<WcagLevel>().unwrap(), WcagLevel::Aaa);
    }

    proptest! {
        #[test]
        fn prop_contrast_is_symmetric_and_bounded(
            a in any::<(u8, u8, u8)>(), b in any::<(u8, u8, u8)>(),
        ) {
            let ca = Rgb { r: a.0, g: a.1, b: a.2 };
            let cb = Rgb { r: b.0, g: b.1, b: b.2 };
            let ab = contrast_ratio(&ca, &cb);
            let ba = contrast_ratio(&cb, &ca);
            prop_assert_eq!(ab, ba);
            prop_assert!(ab >= 1.0 - 1e-6);
            prop_assert!(ab <= 21.0 + 1e-3);
        }
    }
}
