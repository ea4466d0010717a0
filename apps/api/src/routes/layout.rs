use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{AppError, LayoutError};
use crate::layout::accessibility::{
    self, find_accessible_text_color, is_large_text, validate_theme, ContrastCheck, Theme,
    ThemeReport, WcagLevel,
};
use crate::layout::geometry::{CanvasSize, Margins};
use crate::layout::grid::{self, create_grid, GridConfig, GridDescriptor, GridValidation};
use crate::layout::orchestrator::{compute_layout, LayoutRequest, LayoutResult};
use crate::layout::responsive::{classify, scaling_factors, Breakpoint, ScalingFactors};
use crate::layout::typography::{
    line_height, responsive_font_size, ContentRole, FontSizeRequest, Importance, ViewingDistance,
};
use crate::routes::extract::{AppJson, AppQuery};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/layout
pub async fn handle_compute_layout(
    State(state): State<AppState>,
    AppJson(req): AppJson<LayoutRequest>,
) -> Result<Json<LayoutResult>, AppError> {
    let options = state.options.clone();
    let item_count = req.content.len();

    // CPU-bound placement pass; keep it off the async executor.
    let result = tokio::task::spawn_blocking(move || compute_layout(&req, &options))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))??;

    info!(
        items = item_count,
        layout_type = result.layout_type.as_str(),
        warnings = result.warnings.len(),
        "Layout computed"
    );
    Ok(Json(result))
}

// ────────────────────────────────────────────────────────────────────────────
// Grid
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRequest {
    pub canvas: CanvasSize,
    pub columns: Option<i32>,
    pub gutter: Option<f32>,
    pub margins: Option<Margins>,
}

/// Column count used by `POST /api/v1/grid` when the request names none.
pub const DEFAULT_GRID_COLUMNS: i32 = 12;

/// POST /api/v1/grid
/// Columns default to [`DEFAULT_GRID_COLUMNS`]; gutter and margins default to
/// the configured base values.
pub async fn handle_create_grid(
    State(state): State<AppState>,
    AppJson(req): AppJson<GridRequest>,
) -> Json<GridDescriptor> {
    let grid = create_grid(
        req.canvas,
        req.columns.unwrap_or(DEFAULT_GRID_COLUMNS),
        req.gutter.unwrap_or(state.options.base_gutter),
        req.margins.unwrap_or(state.options.base_margins),
    );
    Json(grid)
}

/// POST /api/v1/grid/validate
pub async fn handle_validate_grid(AppJson(config): AppJson<GridConfig>) -> Json<GridValidation> {
    let report = grid::validate(&config);
    debug!(
        valid = report.valid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Grid config validated"
    );
    Json(report)
}

// ────────────────────────────────────────────────────────────────────────────
// Breakpoints
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub breakpoint: Breakpoint,
    pub aspect_ratio: f32,
    pub scaling: ScalingFactors,
}

/// GET /api/v1/breakpoints/classify?width=&height=
pub async fn handle_classify(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ClassifyQuery>,
) -> Json<ClassifyResponse> {
    let canvas = CanvasSize::new(params.width, params.height);
    let classification = classify(params.width, params.height, &state.options.breakpoint_thresholds);
    let scaling = scaling_factors(&classification.breakpoint, &canvas, &state.options.reference_canvas);
    Json(ClassifyResponse {
        breakpoint: classification.breakpoint,
        aspect_ratio: classification.aspect_ratio,
        scaling,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Typography
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSizeBody {
    /// Role name; validated here so an unknown role is a 400, not a JSON error.
    pub role: String,
    pub canvas: CanvasSize,
    /// Required; kept optional here so its absence is reported as a named field.
    pub base_size: Option<f32>,
    #[serde(default)]
    pub content_length: usize,
    #[serde(default)]
    pub viewing_distance: ViewingDistance,
    #[serde(default)]
    pub importance: Importance,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSizeResponse {
    pub font_size: f32,
    pub line_height: f32,
    pub bold: bool,
}

/// POST /api/v1/typography/font-size
pub async fn handle_font_size(
    State(state): State<AppState>,
    AppJson(body): AppJson<FontSizeBody>,
) -> Result<Json<FontSizeResponse>, AppError> {
    let roles = &state.options.font_role_bands;
    let role: ContentRole = body.role.parse()?;
    let base_size = body
        .base_size
        .ok_or_else(|| LayoutError::invalid("baseSize", "is required"))?;
    let request = FontSizeRequest {
        base_size,
        canvas: body.canvas,
        content_length: body.content_length,
        viewing_distance: body.viewing_distance,
        importance: body.importance,
        role,
    };
    let font_size = responsive_font_size(&request, &state.options.typography_reference, roles)?;
    Ok(Json(FontSizeResponse {
        font_size,
        line_height: line_height(font_size, role, roles, state.options.min_line_height_ratio),
        bold: role.is_bold(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Accessibility
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastBody {
    pub foreground: String,
    pub background: String,
    /// Defaults to the configured level.
    pub level: Option<WcagLevel>,
    /// Used when `fontSize` is absent.
    #[serde(default)]
    pub large_text: bool,
    pub font_size: Option<f32>,
    #[serde(default)]
    pub bold: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastResponse {
    #[serde(flatten)]
    pub check: ContrastCheck,
    /// Replacement text color, present only when the check fails.
    pub suggestion: Option<String>,
}

/// POST /api/v1/accessibility/contrast
pub async fn handle_contrast(
    State(state): State<AppState>,
    AppJson(body): AppJson<ContrastBody>,
) -> Json<ContrastResponse> {
    let level = body.level.unwrap_or(state.options.accessibility_level);
    let large_text = match body.font_size {
        Some(size) => is_large_text(size, body.bold),
        None => body.large_text,
    };
    let check = accessibility::validate(&body.foreground, &body.background, level, large_text);
    let suggestion = (!check.passes)
        .then(|| find_accessible_text_color(&body.background, level).to_string());
    Json(ContrastResponse { check, suggestion })
}

#[derive(Debug, Deserialize)]
pub struct ThemeBody {
    #[serde(flatten)]
    pub theme: Theme,
    pub level: Option<WcagLevel>,
}

/// POST /api/v1/accessibility/theme
pub async fn handle_validate_theme(
    State(state): State<AppState>,
    AppJson(body): AppJson<ThemeBody>,
) -> Json<ThemeReport> {
    let level = body.level.unwrap_or(state.options.accessibility_level);
    Json(validate_theme(&body.theme, level))
}
