use review_common::{
    duplicate_key_message, invalid_product_id_message, ErrorEnvelope, Review, TYPE_MISMATCH_MESSAGE,
};

#[test]
fn test_duplicate_key_message_is_exact() {
    assert_eq!(duplicate_key_message(1, 1), "Duplicate key, Product Id: 1, Review Id:1");
    assert_eq!(duplicate_key_message(42, 7), "Duplicate key, Product Id: 42, Review Id:7");
}

#[test]
fn test_invalid_product_id_message() {
    assert_eq!(invalid_product_id_message(-1), "Invalid productId: -1");
}

#[test]
fn test_type_mismatch_message() {
    assert_eq!(TYPE_MISMATCH_MESSAGE, "Type mismatch.");
}

#[test]
fn test_review_serializes_camel_case() {
    let review = Review::new(1, 2, "Author 2", "Subject 2", "Content2", "SA");
    let json = serde_json::to_value(&review).unwrap();
    assert_eq!(json["productId"], 1);
    assert_eq!(json["reviewId"], 2);
    assert_eq!(json["author"], "Author 2");
    assert_eq!(json["serviceAddress"], "SA");
    assert!(json.get("product_id").is_none());
}

#[test]
fn test_review_service_address_defaults_to_empty() {
    let json = r#"{"productId":1,"reviewId":1,"author":"a","subject":"s","content":"c"}"#;
    let review: Review = serde_json::from_str(json).unwrap();
    assert_eq!(review.product_id, 1);
    assert_eq!(review.service_address, "");
}

#[test]
fn test_review_rejects_non_integer_ids() {
    let json = r#"{"productId":"one","reviewId":1,"author":"a","subject":"s","content":"c"}"#;
    assert!(serde_json::from_str::<Review>(json).is_err());
}

#[test]
fn test_error_envelope_shape() {
    let json = r#"{"timestamp":"2024-01-02T03:04:05Z","path":"/reviews","message":"Type mismatch."}"#;
    let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
    assert_eq!(envelope.path, "/reviews");
    assert_eq!(envelope.message, "Type mismatch.");

    let value = serde_json::to_value(&envelope).unwrap();
    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["message", "path", "timestamp"]);
}
