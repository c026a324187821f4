use review_common::{ErrorEnvelope, Result, Review, ReviewError, MIN_PRODUCT_ID};

/// Review client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `host:port` of the review service.
    pub address: String,
}

/// Review service client
pub struct Client {
    pub config: ClientConfig,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build the URL of the reviews collection.
    pub fn build_reviews_url(&self) -> String {
        format!("http://{}/reviews", self.config.address)
    }

    /// List the reviews of a product; an unknown product yields an empty list.
    pub async fn get_reviews(&self, product_id: i32) -> Result<Vec<Review>> {
        check_product_id(product_id)?;

        let response = self
            .http_client
            .get(self.build_reviews_url())
            .query(&[("productId", product_id)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ReviewError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(status, response).await);
        }

        response
            .json::<Vec<Review>>()
            .await
            .map_err(|e| ReviewError::InvalidResponse(e.to_string()))
    }

    /// Create a review; returns the stored review as echoed by the service.
    /// A review whose (productId, reviewId) pair already exists fails with
    /// `ReviewError::Unprocessable` carrying the duplicate key message.
    pub async fn create_review(&self, review: &Review) -> Result<Review> {
        check_product_id(review.product_id)?;

        let response = self
            .http_client
            .post(self.build_reviews_url())
            .header("Accept", "application/json")
            .json(review)
            .send()
            .await
            .map_err(|e| ReviewError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(status, response).await);
        }

        response
            .json::<Review>()
            .await
            .map_err(|e| ReviewError::InvalidResponse(e.to_string()))
    }

    /// Delete all reviews of a product (idempotent)
    pub async fn delete_reviews(&self, product_id: i32) -> Result<()> {
        check_product_id(product_id)?;

        let response = self
            .http_client
            .delete(self.build_reviews_url())
            .query(&[("productId", product_id)])
            .send()
            .await
            .map_err(|e| ReviewError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(status, response).await);
        }

        Ok(())
    }
}

fn check_product_id(product_id: i32) -> Result<()> {
    if product_id < MIN_PRODUCT_ID {
        return Err(ReviewError::InvalidProductId(product_id));
    }
    Ok(())
}

async fn parse_error_response(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> ReviewError {
    let message = response
        .json::<ErrorEnvelope>()
        .await
        .map(|envelope| envelope.message)
        .unwrap_or_else(|_| format!("Server returned status: {}", status));

    match status {
        reqwest::StatusCode::BAD_REQUEST => ReviewError::BadRequest(message),
        reqwest::StatusCode::UNPROCESSABLE_ENTITY => ReviewError::Unprocessable(message),
        _ => ReviewError::HttpError(status.as_u16(), message),
    }
}
