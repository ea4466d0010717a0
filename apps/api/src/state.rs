use std::sync::Arc;

use crate::config::Config;
use crate::layout::LayoutOptions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Engine configuration. Read-only after startup; requests never mutate it.
    pub options: Arc<LayoutOptions>,
}
