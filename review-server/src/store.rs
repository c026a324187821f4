//! Review persistence behind the [`ReviewStore`] trait.
//!
//! The rest of the service only talks to the trait; [`InMemoryReviewStore`] is the
//! engine the binary ships with.

use async_trait::async_trait;
use review_common::Review;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::LOCK_TIMEOUT;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Duplicate key, Product Id: {product_id}, Review Id:{review_id}")]
    DuplicateKey { product_id: i32, review_id: i32 },

    #[error("Server error: {0}")]
    Unavailable(String),
}

/// A persisted review row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntity {
    /// Surrogate key assigned by the store.
    pub id: u64,
    /// Optimistic-lock version; 0 for a freshly inserted row.
    pub version: u32,
    pub product_id: i32,
    pub review_id: i32,
    pub author: String,
    pub subject: String,
    pub content: String,
}

impl ReviewEntity {
    /// Map to the wire representation, stamped with the answering instance's address.
    pub fn into_review(self, service_address: &str) -> Review {
        Review {
            product_id: self.product_id,
            review_id: self.review_id,
            author: self.author,
            subject: self.subject,
            content: self.content,
            service_address: service_address.to_string(),
        }
    }
}

/// Data-access contract the request core depends on.
///
/// `insert` must be atomic with respect to the `(product_id, review_id)` uniqueness
/// check: of any number of concurrent inserts for one pair, at most one succeeds and
/// the others fail with [`StoreError::DuplicateKey`].
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, review: &Review) -> Result<ReviewEntity, StoreError>;

    /// Reviews for `product_id` in ascending review id order; empty if none.
    async fn find_by_product_id(&self, product_id: i32) -> Result<Vec<ReviewEntity>, StoreError>;

    /// Removes every review for `product_id` and returns how many were removed.
    async fn delete_by_product_id(&self, product_id: i32) -> Result<usize, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn count_by_product_id(&self, product_id: i32) -> Result<usize, StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct StoreState {
    pub rows: BTreeMap<(i32, i32), ReviewEntity>,
    pub next_id: u64,
}

impl StoreState {
    fn product_rows(&self, product_id: i32) -> impl Iterator<Item = &ReviewEntity> {
        self.rows
            .range((product_id, i32::MIN)..=(product_id, i32::MAX))
            .map(|(_, row)| row)
    }
}

/// In-process store; the unique key is the map key itself.
pub struct InMemoryReviewStore {
    pub state: RwLock<StoreState>,
    lock_timeout: Duration,
}

impl Default for InMemoryReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            lock_timeout,
        }
    }

    async fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        timeout(self.lock_timeout, self.state.read())
            .await
            .map_err(|_| lock_timed_out())
    }

    async fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        timeout(self.lock_timeout, self.state.write())
            .await
            .map_err(|_| lock_timed_out())
    }
}

fn lock_timed_out() -> StoreError {
    warn!("review store lock acquisition timed out");
    StoreError::Unavailable("Lock acquisition timed out".to_string())
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn insert(&self, review: &Review) -> Result<ReviewEntity, StoreError> {
        let key = (review.product_id, review.review_id);
        let mut guard = self.write().await?;

        if guard.rows.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                product_id: review.product_id,
                review_id: review.review_id,
            });
        }

        guard.next_id += 1;
        let entity = ReviewEntity {
            id: guard.next_id,
            version: 0,
            product_id: review.product_id,
            review_id: review.review_id,
            author: review.author.clone(),
            subject: review.subject.clone(),
            content: review.content.clone(),
        };
        guard.rows.insert(key, entity.clone());
        Ok(entity)
    }

    async fn find_by_product_id(&self, product_id: i32) -> Result<Vec<ReviewEntity>, StoreError> {
        let guard = self.read().await?;
        let rows: Vec<ReviewEntity> = guard.product_rows(product_id).cloned().collect();
        debug!(product_id, found = rows.len(), "looked up reviews");
        Ok(rows)
    }

    async fn delete_by_product_id(&self, product_id: i32) -> Result<usize, StoreError> {
        let mut guard = self.write().await?;
        let before = guard.rows.len();
        guard.rows.retain(|&(p, _), _| p != product_id);
        Ok(before - guard.rows.len())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read().await?.rows.len())
    }

    async fn count_by_product_id(&self, product_id: i32) -> Result<usize, StoreError> {
        Ok(self.read().await?.product_rows(product_id).count())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.write().await?.rows.clear();
        Ok(())
    }
}
