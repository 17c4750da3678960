//! Error types for the API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that converts
//! into an HTTP response via its [`IntoResponse`] implementation. Engine
//! errors keep their meaning on the wire: invalid input is 400, missing
//! resources are 404, update conflicts are 409, and an unreachable store
//! is 503.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tally_engine::EngineError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The engine rejected or could not complete the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A request body failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A path or query parameter could not be interpreted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The request carried no API key, or the wrong one.
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// A serialization error while producing a response.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Engine(EngineError::InvalidInput(_)) | Self::Validation(_) | Self::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Engine(EngineError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Engine(EngineError::ConflictRace(_)) => StatusCode::CONFLICT,
            Self::Engine(EngineError::StorageUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
