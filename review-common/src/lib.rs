use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned for a missing or non-integer `productId` query parameter.
pub const TYPE_MISMATCH_MESSAGE: &str = "Type mismatch.";

/// Smallest product id the service accepts.
pub const MIN_PRODUCT_ID: i32 = 1;

/// Conflict message for an insert whose (productId, reviewId) pair already exists.
pub fn duplicate_key_message(product_id: i32, review_id: i32) -> String {
    format!("Duplicate key, Product Id: {}, Review Id:{}", product_id, review_id)
}

pub fn invalid_product_id_message(product_id: i32) -> String {
    format!("Invalid productId: {}", product_id)
}

/// A customer review of a product, keyed by `(product_id, review_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub product_id: i32,
    pub review_id: i32,
    pub author: String,
    pub subject: String,
    pub content: String,
    /// Identifies the service instance that produced this representation.
    #[serde(default)]
    pub service_address: String,
}

impl Review {
    pub fn new(
        product_id: i32,
        review_id: i32,
        author: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
        service_address: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            review_id,
            author: author.into(),
            subject: subject.into(),
            content: content.into(),
            service_address: service_address.into(),
        }
    }
}

/// JSON error envelope returned by the server for all error responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub message: String,
}

/// Error types for review client operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable entity: {0}")]
    Unprocessable(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {0}: {1}")]
    HttpError(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid productId: {0}")]
    InvalidProductId(i32),
}

/// Result type for review client operations
pub type Result<T> = std::result::Result<T, ReviewError>;
