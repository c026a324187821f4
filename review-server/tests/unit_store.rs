use review_common::Review;
use review_server::store::{InMemoryReviewStore, ReviewStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

fn review(product_id: i32, review_id: i32) -> Review {
    Review::new(product_id, review_id, "a", "s", "c", "SA")
}

#[tokio::test]
async fn test_find_on_empty_store_is_empty() {
    let store = InMemoryReviewStore::new();
    assert!(store.find_by_product_id(1).await.unwrap().is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_assigns_ids_and_initial_version() {
    let store = InMemoryReviewStore::new();
    let first = store.insert(&review(1, 1)).await.unwrap();
    let second = store.insert(&review(1, 2)).await.unwrap();

    assert_eq!(first.version, 0);
    assert!(second.id > first.id, "surrogate ids must increase");
    assert_eq!((second.product_id, second.review_id), (1, 2));
}

#[tokio::test]
async fn test_insert_duplicate_fails_without_overwrite() {
    let store = InMemoryReviewStore::new();
    store.insert(&review(1, 1)).await.unwrap();

    let mut again = review(1, 1);
    again.author = "someone else".to_string();
    let err = store.insert(&again).await.unwrap_err();
    assert_eq!(err, StoreError::DuplicateKey { product_id: 1, review_id: 1 });
    assert_eq!(err.to_string(), "Duplicate key, Product Id: 1, Review Id:1");

    let rows = store.find_by_product_id(1).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].author, "a");
}

#[tokio::test]
async fn test_same_review_id_under_different_products_is_allowed() {
    let store = InMemoryReviewStore::new();
    store.insert(&review(1, 1)).await.unwrap();
    store.insert(&review(2, 1)).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_find_orders_by_review_id() {
    let store = InMemoryReviewStore::new();
    for review_id in [5, 2, 9, 1] {
        store.insert(&review(3, review_id)).await.unwrap();
    }
    let ids: Vec<i32> = store
        .find_by_product_id(3)
        .await
        .unwrap()
        .iter()
        .map(|r| r.review_id)
        .collect();
    assert_eq!(ids, vec![1, 2, 5, 9]);
}

#[tokio::test]
async fn test_find_handles_extreme_review_ids() {
    let store = InMemoryReviewStore::new();
    store.insert(&review(1, i32::MIN)).await.unwrap();
    store.insert(&review(1, i32::MAX)).await.unwrap();
    store.insert(&review(2, 0)).await.unwrap();
    assert_eq!(store.count_by_product_id(1).await.unwrap(), 2);
}

#[tokio::test]
async fn test_delete_by_product_id_reports_removed_rows() {
    let store = InMemoryReviewStore::new();
    store.insert(&review(1, 1)).await.unwrap();
    store.insert(&review(1, 2)).await.unwrap();
    store.insert(&review(2, 1)).await.unwrap();

    assert_eq!(store.delete_by_product_id(1).await.unwrap(), 2);
    assert_eq!(store.delete_by_product_id(1).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_all_clears_store() {
    let store = InMemoryReviewStore::new();
    store.insert(&review(1, 1)).await.unwrap();
    store.insert(&review(2, 1)).await.unwrap();
    store.delete_all().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_into_review_stamps_service_address() {
    let store = InMemoryReviewStore::new();
    let row = store.insert(&review(1, 1)).await.unwrap();
    let api = row.into_review("host:1234");
    assert_eq!(api.service_address, "host:1234");
    assert_eq!((api.product_id, api.review_id), (1, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_of_one_key_admit_exactly_one() {
    let store = Arc::new(InMemoryReviewStore::new());
    let handles: Vec<_> = (0..32)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.insert(&review(1, 1)).await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(StoreError::DuplicateKey { product_id: 1, review_id: 1 }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_lock_timeout_is_unavailable() {
    let store = InMemoryReviewStore::with_lock_timeout(Duration::from_millis(10));
    let _held = store.state.write().await;
    let err = store.insert(&review(1, 1)).await.unwrap_err();
    assert_eq!(err, StoreError::Unavailable("Lock acquisition timed out".to_string()));
    assert_eq!(err.to_string(), "Server error: Lock acquisition timed out");
}
