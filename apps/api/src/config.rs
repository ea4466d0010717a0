use anyhow::{anyhow, Context, Result};

use crate::layout::accessibility::WcagLevel;
use crate::layout::geometry::CanvasSize;
use crate::layout::options::LayoutOptions;

/// Service configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub accessibility_level: WcagLevel,
    pub reference_width: Option<f32>,
    pub reference_height: Option<f32>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            accessibility_level: match lookup("LAYOUT_ACCESSIBILITY_LEVEL") {
                Some(raw) => raw
                    .parse()
                    .map_err(|e: String| anyhow!(e))
                    .context("LAYOUT_ACCESSIBILITY_LEVEL must be AA or AAA")?,
                None => WcagLevel::default(),
            },
            reference_width: parse_optional(&lookup, "LAYOUT_REFERENCE_WIDTH")?,
            reference_height: parse_optional(&lookup, "LAYOUT_REFERENCE_HEIGHT")?,
        })
    }

    /// The immutable engine configuration shared by every request.
    pub fn layout_options(&self) -> Result<LayoutOptions> {
        let defaults = LayoutOptions::default();
        let options = LayoutOptions {
            accessibility_level: self.accessibility_level,
            reference_canvas: CanvasSize::new(
                self.reference_width.unwrap_or(defaults.reference_canvas.width),
                self.reference_height.unwrap_or(defaults.reference_canvas.height),
            ),
            ..defaults
        };
        options.validate().context("invalid layout options")?;
        Ok(options)
    }
}

fn parse_optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<f32>> {
    lookup(key)
        .map(|raw| {
            raw.parse::<f32>()
                .with_context(|| format!("{key} must be a number, got '{raw}'"))
        })
        .transpose()
}
