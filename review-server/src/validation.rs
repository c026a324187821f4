use axum::extract::{rejection::QueryRejection, Query};
use review_common::{invalid_product_id_message, Review, MIN_PRODUCT_ID};
use serde::Deserialize;

use crate::error::ApiError;

/// Query string accepted by `GET` and `DELETE /reviews`.
///
/// `productId` is kept as raw text so a missing or non-numeric value reaches
/// [`parse_product_id`] instead of failing inside the extractor.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReviewQuery {
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
}

impl ReviewQuery {
    pub fn with_product_id(raw: impl Into<String>) -> Self {
        Self { product_id: Some(raw.into()) }
    }
}

/// Parse a raw `productId` token into an integer.
pub fn parse_product_id(raw: Option<&str>) -> Result<i32, ApiError> {
    match raw {
        Some(token) if !token.is_empty() => token.parse::<i32>().map_err(|_| ApiError::TypeMismatch),
        _ => Err(ApiError::TypeMismatch),
    }
}

pub fn check_product_id(product_id: i32) -> Result<i32, ApiError> {
    if product_id < MIN_PRODUCT_ID {
        return Err(ApiError::InvalidInput(invalid_product_id_message(product_id)));
    }
    Ok(product_id)
}

/// Validate the `productId` query parameter of a list or delete request.
pub fn product_id_from_query(
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<i32, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::TypeMismatch)?;
    let product_id = parse_product_id(query.product_id.as_deref())?;
    check_product_id(product_id)
}

pub fn validate_review(review: &Review) -> Result<(), ApiError> {
    check_product_id(review.product_id).map(|_| ())
}
