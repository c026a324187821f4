use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use review_common::ErrorEnvelope;
use thiserror::Error;
use tracing::warn;

use crate::store::StoreError;
use crate::Clock;

/// Failures surfaced at the HTTP boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Type mismatch.")]
    TypeMismatch,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    MalformedBody(String),

    #[error("Duplicate key, Product Id: {product_id}, Review Id:{review_id}")]
    DuplicateKey { product_id: i32, review_id: i32 },

    #[error("Server error: {0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::TypeMismatch | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidInput(_) | ApiError::DuplicateKey { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { product_id, review_id } => {
                warn!(product_id, review_id, "rejected duplicate review");
                ApiError::DuplicateKey { product_id, review_id }
            }
            StoreError::Unavailable(reason) => ApiError::Unavailable(reason),
        }
    }
}

/// Render `error` as a JSON [`ErrorEnvelope`] for the request at `path`.
pub fn error_response(error: &ApiError, path: &str, clock: &dyn Clock) -> Response {
    let envelope = ErrorEnvelope {
        timestamp: clock.now(),
        path: path.to_string(),
        message: error.to_string(),
    };
    (error.status_code(), Json(envelope)).into_response()
}
