//! Review endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::ProductId;
use domain::Review;
use market_store::MarketStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

#[derive(Deserialize)]
pub struct SubmitReviewRequest {
    pub product_id: Uuid,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub buyer_id: String,
    pub product_id: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
}

impl From<&Review> for ReviewResponse {
    fn from(review: &Review) -> Self {
        ReviewResponse {
            buyer_id: review.buyer_id.to_string(),
            product_id: review.product_id.to_string(),
            rating: review.rating.stars(),
            comment: review.comment.clone(),
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

/// POST /reviews — create or replace the caller's review for a product.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let identity = Identity::from_headers(&headers)?;

    let review = state
        .reviews
        .submit(
            identity.buyer(),
            ProductId::from_uuid(req.product_id),
            req.rating,
            req.comment,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(&review))))
}

/// GET /products/:id/reviews — public listing, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state
        .reviews
        .for_product(ProductId::from_uuid(id))
        .await?;

    Ok(Json(reviews.iter().map(ReviewResponse::from).collect()))
}
