// Responsive layout engine: grid geometry, breakpoints, typography, contrast.
// Every function here is pure; CPU-bound calls from async handlers go through
// tokio::task::spawn_blocking.

pub mod accessibility;
pub mod content;
pub mod geometry;
pub mod grid;
pub mod options;
pub mod orchestrator;
pub mod responsive;
pub mod text_metrics;
pub mod typography;

// Re-export the public API consumed by the HTTP layer and library callers.
pub use content::{ContentItem, ContentItemSpec, PositionedElement};
pub use geometry::{CanvasSize, Margins, Rect};
pub use grid::{AreaMap, AreaTemplate, GridArea, GridDescriptor};
pub use options::LayoutOptions;
pub use orchestrator::{compute_layout, LayoutRequest, LayoutResult};
pub use responsive::{Breakpoint, BreakpointKind, LayoutType, ScalingFactors};
pub use typography::ContentRole;
