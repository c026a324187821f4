use std::time::Duration;

/// Maximum time to wait when acquiring the store's read or write lock.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Largest request body accepted on `POST /reviews`.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:7003";

pub const DEFAULT_LOG_FILTER: &str = "review_server=info,tower_http=info";
