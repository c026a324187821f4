use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Query, State,
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use review_common::Review;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod error;
pub mod store;
pub mod validation;

use config::MAX_BODY_SIZE;
use error::{error_response, ApiError};
use store::{InMemoryReviewStore, ReviewStore};
use validation::{product_id_from_query, validate_review, ReviewQuery};

/// Abstraction over current time for testability.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReviewStore>,
    pub clock: Arc<dyn Clock>,
    /// Reported as `serviceAddress` on every review this instance returns.
    pub service_address: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        clock: Arc<dyn Clock>,
        service_address: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            service_address: service_address.into(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

/// Review service
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Get the server's configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Create the application router with the given state
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route(
                "/reviews",
                get(handle_get_reviews)
                    .post(handle_create_review)
                    .delete(handle_delete_reviews),
            )
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the server on a fresh in-memory store, signalling `ready_tx` with the bound
    /// address once accepting connections
    pub async fn run(
        self,
        ready_tx: tokio::sync::oneshot::Sender<SocketAddr>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_with_store(Arc::new(InMemoryReviewStore::new()), ready_tx)
            .await
    }

    /// Run the server against `store`, signalling `ready_tx` with the bound address
    pub async fn run_with_store(
        self,
        store: Arc<dyn ReviewStore>,
        ready_tx: tokio::sync::oneshot::Sender<SocketAddr>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        let state = AppState::new(store, Arc::new(SystemClock), local_addr.to_string());
        let app = Self::create_router(state);
        info!(%local_addr, "review service listening");
        ready_tx.send(local_addr).ok();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Handler for GET /reviews?productId={id} — returns the product's reviews, `[]` if none.
pub async fn handle_get_reviews(
    State(state): State<AppState>,
    uri: Uri,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Response {
    match get_reviews(&state, query).await {
        Ok(reviews) => (StatusCode::OK, Json(reviews)).into_response(),
        Err(e) => error_response(&e, uri.path(), state.clock.as_ref()),
    }
}

async fn get_reviews(
    state: &AppState,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Vec<Review>, ApiError> {
    let product_id = product_id_from_query(query)?;
    let rows = state.store.find_by_product_id(product_id).await?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_review(&state.service_address))
        .collect())
}

/// Handler for POST /reviews — stores a new review and echoes it back.
/// An existing (productId, reviewId) pair is rejected with 422.
pub async fn handle_create_review(
    State(state): State<AppState>,
    uri: Uri,
    payload: Result<Json<Review>, JsonRejection>,
) -> Response {
    match create_review(&state, payload).await {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(e) => error_response(&e, uri.path(), state.clock.as_ref()),
    }
}

async fn create_review(
    state: &AppState,
    payload: Result<Json<Review>, JsonRejection>,
) -> Result<Review, ApiError> {
    let Json(review) = payload.map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;
    validate_review(&review)?;
    let row = state.store.insert(&review).await?;
    info!(
        product_id = row.product_id,
        review_id = row.review_id,
        id = row.id,
        "created review"
    );
    Ok(row.into_review(&state.service_address))
}

/// Handler for DELETE /reviews?productId={id} — removes all of the product's reviews.
/// Succeeds with an empty body whether or not any review existed.
pub async fn handle_delete_reviews(
    State(state): State<AppState>,
    uri: Uri,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Response {
    match delete_reviews(&state, query).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(&e, uri.path(), state.clock.as_ref()),
    }
}

async fn delete_reviews(
    state: &AppState,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<(), ApiError> {
    let product_id = product_id_from_query(query)?;
    let removed = state.store.delete_by_product_id(product_id).await?;
    info!(product_id, removed, "deleted reviews");
    Ok(())
}
