use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    List,
    Create,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    Created,
    /// The create was rejected with a duplicate key (422).
    Conflict,
    /// Review ids returned by a list, in response order.
    Listed { review_ids: Vec<i32> },
    Deleted,
    /// 5xx or network failure; whether the server applied the operation is unknown.
    Error,
}

#[derive(Debug, Clone)]
pub struct OpRecord {
    /// When the client sent the request.
    pub client_start_ts: Instant,
    /// When the client received the response (the ACK).
    pub client_ack_ts: Instant,
    pub product_id: i32,
    /// Set for creates only.
    pub review_id: Option<i32>,
    pub kind: OpKind,
    pub outcome: OpOutcome,
}

pub struct History(pub Vec<OpRecord>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Two creates of one (productId, reviewId) both succeeded and no delete of the
    /// product could have run between them.
    DuplicateAccepted { first_start_ts: Instant, second_start_ts: Instant },
    /// A create was rejected as a duplicate although no create of that pair could have
    /// reached the server first.
    ConflictWithoutCreate,
    /// A list returned a review id that no create of that pair had started before the
    /// list was acknowledged.
    UnknownReviewListed,
    /// A list response was not in ascending review id order.
    ListOutOfOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub product_id: i32,
    pub review_id: i32,
    pub kind: ViolationKind,
}

/// A client-observed execution window.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    ack: Instant,
}

impl History {
    /// Check the recorded operations against the uniqueness and listing contract.
    pub fn check_correctness(&self) -> Vec<Violation> {
        let created = build_create_index(&self.0, |o| matches!(o, OpOutcome::Created));
        let attempted = build_create_index(&self.0, |o| {
            matches!(o, OpOutcome::Created | OpOutcome::Error)
        });
        let deletes = build_delete_index(&self.0);

        let mut violations = Vec::new();
        violations.extend(duplicate_accepts(&created, &deletes));
        for r in &self.0 {
            match (&r.outcome, r.review_id) {
                (OpOutcome::Conflict, Some(review_id)) => {
                    if !possibly_created_before(&attempted, r.product_id, review_id, r.client_ack_ts) {
                        violations.push(Violation {
                            product_id: r.product_id,
                            review_id,
                            kind: ViolationKind::ConflictWithoutCreate,
                        });
                    }
                }
                (OpOutcome::Listed { review_ids }, _) => {
                    violations.extend(classify_list(r, review_ids, &attempted));
                }
                _ => {}
            }
        }
        violations
    }
}

// --- Index builders ---

/// (productId, reviewId) → windows of every create whose outcome matches `include`,
/// sorted by start time.
fn build_create_index(
    records: &[OpRecord],
    include: impl Fn(&OpOutcome) -> bool,
) -> HashMap<(i32, i32), Vec<Window>> {
    let mut index: HashMap<(i32, i32), Vec<Window>> = HashMap::new();
    for r in records {
        if let (OpKind::Create, Some(review_id)) = (r.kind, r.review_id) {
            if include(&r.outcome) {
                index
                    .entry((r.product_id, review_id))
                    .or_default()
                    .push(Window { start: r.client_start_ts, ack: r.client_ack_ts });
            }
        }
    }
    for windows in index.values_mut() {
        windows.sort_by_key(|w| w.start);
    }
    index
}

/// productId → windows of every delete that may have been applied (succeeded or errored).
fn build_delete_index(records: &[OpRecord]) -> HashMap<i32, Vec<Window>> {
    let mut index: HashMap<i32, Vec<Window>> = HashMap::new();
    for r in records {
        if r.kind == OpKind::Delete && matches!(r.outcome, OpOutcome::Deleted | OpOutcome::Error) {
            index
                .entry(r.product_id)
                .or_default()
                .push(Window { start: r.client_start_ts, ack: r.client_ack_ts });
        }
    }
    index
}

// --- Checks ---

fn duplicate_accepts(
    created: &HashMap<(i32, i32), Vec<Window>>,
    deletes: &HashMap<i32, Vec<Window>>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (&(product_id, review_id), windows) in created {
        for pair in windows.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            // The delete must be able to land after one create and before the other.
            let span_start = first.start.min(second.start);
            let span_end = first.ack.max(second.ack);
            let separated = deletes
                .get(&product_id)
                .map(|ds| ds.iter().any(|d| d.ack > span_start && d.start < span_end))
                .unwrap_or(false);
            if !separated {
                violations.push(Violation {
                    product_id,
                    review_id,
                    kind: ViolationKind::DuplicateAccepted {
                        first_start_ts: first.start,
                        second_start_ts: second.start,
                    },
                });
            }
        }
    }
    violations
}

/// Returns `true` if some create of the pair started before `deadline`.
fn possibly_created_before(
    attempted: &HashMap<(i32, i32), Vec<Window>>,
    product_id: i32,
    review_id: i32,
    deadline: Instant,
) -> bool {
    attempted
        .get(&(product_id, review_id))
        .map(|ws| ws.iter().any(|w| w.start < deadline))
        .unwrap_or(false)
}

fn classify_list(
    record: &OpRecord,
    review_ids: &[i32],
    attempted: &HashMap<(i32, i32), Vec<Window>>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    if review_ids.windows(2).any(|w| w[0] >= w[1]) {
        violations.push(Violation {
            product_id: record.product_id,
            review_id: review_ids.first().copied().unwrap_or_default(),
            kind: ViolationKind::ListOutOfOrder,
        });
    }
    for &review_id in review_ids {
        if !possibly_created_before(attempted, record.product_id, review_id, record.client_ack_ts) {
            violations.push(Violation {
                product_id: record.product_id,
                review_id,
                kind: ViolationKind::UnknownReviewListed,
            });
        }
    }
    violations
}
