use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use review_client::{Client, ClientConfig};
use review_common::{Review, ReviewError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::history::{History, OpKind, OpOutcome, OpRecord};
use crate::metrics::Metrics;
use crate::workload::{Op, WorkloadProfile};

/// Shape of the (productId, reviewId) space the workers draw from.
/// Small spaces force duplicate-key contention.
#[derive(Debug, Clone, Copy)]
pub struct KeySpace {
    pub products: i32,
    pub reviews_per_product: i32,
}

impl KeySpace {
    pub fn sample(&self, rng: &mut impl Rng) -> (i32, i32) {
        (
            rng.gen_range(1..=self.products),
            rng.gen_range(1..=self.reviews_per_product),
        )
    }
}

/// Drive the service at `address` with `concurrency` workers for `duration`,
/// recording every operation. Returns raw metrics and the merged operation history
/// for post-run correctness checking.
pub async fn run(
    address: String,
    profile: WorkloadProfile,
    key_space: KeySpace,
    concurrency: usize,
    duration: Duration,
) -> (Metrics, History) {
    let client = Arc::new(Client::new(ClientConfig { address }));
    let run_start = Instant::now();

    let workers = (0..concurrency).map(move |_| {
        let client = client.clone();
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut records = Vec::new();
            while run_start.elapsed() < duration {
                let op = profile.sample(&mut rng);
                let (product_id, review_id) = key_space.sample(&mut rng);
                records.push(execute_op(&client, op, product_id, review_id, &mut rng).await);
            }
            records
        })
    });

    let records: Vec<OpRecord> = join_all(workers)
        .await
        .into_iter()
        .filter_map(Result::ok)
        .flatten()
        .collect();

    let elapsed_secs = run_start.elapsed().as_secs_f64();
    let metrics = Metrics {
        requests_total: records.len() as u64,
        errors_5xx: records.iter().filter(|r| is_error(&r.outcome)).count() as u64,
        conflicts: records
            .iter()
            .filter(|r| r.outcome == OpOutcome::Conflict)
            .count() as u64,
        latency_ns: records
            .iter()
            .map(|r| (r.client_ack_ts - r.client_start_ts).as_nanos() as u64)
            .collect(),
        elapsed_secs,
    };
    (metrics, History(records))
}

async fn execute_op(
    client: &Client,
    op: Op,
    product_id: i32,
    review_id: i32,
    rng: &mut impl Rng,
) -> OpRecord {
    let client_start_ts = Instant::now();
    let (kind, review_id, outcome) = match op {
        Op::List => {
            let outcome = match client.get_reviews(product_id).await {
                Ok(reviews) => OpOutcome::Listed {
                    review_ids: reviews.iter().map(|r| r.review_id).collect(),
                },
                Err(_) => OpOutcome::Error,
            };
            (OpKind::List, None, outcome)
        }
        Op::Create => {
            let review = generate_review(rng, product_id, review_id);
            let outcome = match client.create_review(&review).await {
                Ok(_) => OpOutcome::Created,
                Err(ReviewError::Unprocessable(_)) => OpOutcome::Conflict,
                Err(_) => OpOutcome::Error,
            };
            (OpKind::Create, Some(review_id), outcome)
        }
        Op::Delete => {
            let outcome = match client.delete_reviews(product_id).await {
                Ok(()) => OpOutcome::Deleted,
                Err(_) => OpOutcome::Error,
            };
            (OpKind::Delete, None, outcome)
        }
    };
    OpRecord {
        client_start_ts,
        client_ack_ts: Instant::now(),
        product_id,
        review_id,
        kind,
        outcome,
    }
}

/// Generate a review with random text content (8–256 characters).
pub fn generate_review(rng: &mut impl Rng, product_id: i32, review_id: i32) -> Review {
    let len: usize = rng.gen_range(8..=256);
    let content: String = (0..len).map(|_| rng.gen_range('a'..='z')).collect();
    Review::new(
        product_id,
        review_id,
        format!("Author {review_id}"),
        format!("Subject {review_id}"),
        content,
        "stress",
    )
}

/// Returns `true` if `outcome` represents a server-side error (5xx or network failure).
pub fn is_error(outcome: &OpOutcome) -> bool {
    matches!(outcome, OpOutcome::Error)
}
