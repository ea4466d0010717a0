use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures raised by the layout engine itself.
///
/// Only invalid *required* input ends up here. Malformed auxiliary data
/// (bad area strings, unknown breakpoint keys, unparseable colors) is
/// recovered locally and reported as a warning on the result instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Unsupported content role: '{0}'")]
    UnsupportedRole(String),

    #[error("Unsupported layout type: '{0}'")]
    UnsupportedLayoutType(String),

    #[error("Invalid layout options: {0}")]
    InvalidOptions(String),
}

impl LayoutError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LayoutError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Layout(e @ LayoutError::InvalidArgument { .. })
            | AppError::Layout(e @ LayoutError::InvalidOptions(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Layout(e) => (StatusCode::BAD_REQUEST, "UNSUPPORTED", e.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_names_the_field() {
        let err = LayoutError::invalid("canvas.width", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'canvas.width': must be greater than 0"
        );
    }

    #[test]
    fn test_layout_errors_map_to_bad_request() {
        let resp = AppError::from(LayoutError::UnsupportedRole("banner".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::from(LayoutError::invalid("base_size", "missing")).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let resp = AppError::Validation("missing field `canvas`".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let resp = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
