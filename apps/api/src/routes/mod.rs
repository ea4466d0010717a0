pub mod extract;
pub mod health;
pub mod layout;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout", post(layout::handle_compute_layout))
        .route("/api/v1/grid", post(layout::handle_create_grid))
        .route("/api/v1/grid/validate", post(layout::handle_validate_grid))
        .route("/api/v1/breakpoints/classify", get(layout::handle_classify))
        // Typography & accessibility
        .route("/api/v1/typography/font-size", post(layout::handle_font_size))
        .route("/api/v1/accessibility/contrast", post(layout::handle_contrast))
        .route("/api/v1/accessibility/theme", post(layout::handle_validate_theme))
        .with_state(state)
}
