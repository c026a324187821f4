use axum::extract::Query;
use axum::http::StatusCode;
use review_common::Review;
use review_server::error::ApiError;
use review_server::store::StoreError;
use review_server::validation::{
    check_product_id, parse_product_id, product_id_from_query, validate_review, ReviewQuery,
};

#[test]
fn test_parse_product_id_accepts_integers() {
    assert_eq!(parse_product_id(Some("1")), Ok(1));
    assert_eq!(parse_product_id(Some("213")), Ok(213));
    assert_eq!(parse_product_id(Some("-1")), Ok(-1));
}

#[test]
fn test_parse_product_id_rejects_missing_empty_and_text() {
    assert_eq!(parse_product_id(None), Err(ApiError::TypeMismatch));
    assert_eq!(parse_product_id(Some("")), Err(ApiError::TypeMismatch));
    assert_eq!(parse_product_id(Some("no-integer")), Err(ApiError::TypeMismatch));
    assert_eq!(parse_product_id(Some("1.5")), Err(ApiError::TypeMismatch));
    assert_eq!(parse_product_id(Some("99999999999")), Err(ApiError::TypeMismatch));
}

#[test]
fn test_check_product_id_bounds() {
    assert_eq!(check_product_id(1), Ok(1));
    assert_eq!(
        check_product_id(0),
        Err(ApiError::InvalidInput("Invalid productId: 0".to_string()))
    );
}

#[test]
fn test_product_id_from_query() {
    assert_eq!(product_id_from_query(Ok(Query(ReviewQuery::with_product_id("4")))), Ok(4));
    assert_eq!(
        product_id_from_query(Ok(Query(ReviewQuery::default()))),
        Err(ApiError::TypeMismatch)
    );
    assert_eq!(
        product_id_from_query(Ok(Query(ReviewQuery::with_product_id("-3")))),
        Err(ApiError::InvalidInput("Invalid productId: -3".to_string()))
    );
}

#[test]
fn test_validate_review() {
    assert!(validate_review(&Review::new(1, 1, "a", "s", "c", "")).is_ok());
    assert!(validate_review(&Review::new(-1, 1, "a", "s", "c", "")).is_err());
}

#[test]
fn test_api_error_status_codes() {
    assert_eq!(ApiError::TypeMismatch.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::MalformedBody("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        ApiError::InvalidInput("x".into()).status_code(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        ApiError::DuplicateKey { product_id: 1, review_id: 1 }.status_code(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        ApiError::Unavailable("x".into()).status_code(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[test]
fn test_api_error_messages() {
    assert_eq!(ApiError::TypeMismatch.to_string(), review_common::TYPE_MISMATCH_MESSAGE);
    assert_eq!(
        ApiError::DuplicateKey { product_id: 1, review_id: 1 }.to_string(),
        review_common::duplicate_key_message(1, 1)
    );
}

#[test]
fn test_store_error_conversion() {
    let dup: ApiError = StoreError::DuplicateKey { product_id: 2, review_id: 3 }.into();
    assert_eq!(dup, ApiError::DuplicateKey { product_id: 2, review_id: 3 });

    let down: ApiError = StoreError::Unavailable("Lock acquisition timed out".into()).into();
    assert_eq!(down.to_string(), "Server error: Lock acquisition timed out");
}
