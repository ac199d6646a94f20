//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use market_store::MarketStore;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order_count: usize,
    pub orders: Vec<CreatedOrderResponse>,
}

#[derive(Serialize)]
pub struct CreatedOrderResponse {
    pub order_id: String,
    /// `"platform"` or the seller's id.
    pub seller: String,
    pub total_cents: i64,
}

/// POST /checkout — converts the caller's cart into one order per seller.
///
/// No request body: the buyer identity is the whole input.
#[tracing::instrument(skip(state, headers))]
pub async fn create<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let identity = Identity::from_headers(&headers)?;

    let receipt = state.checkout.checkout(identity.buyer()).await?;

    let orders: Vec<CreatedOrderResponse> = receipt
        .orders
        .iter()
        .map(|o| CreatedOrderResponse {
            order_id: o.order_id.to_string(),
            seller: o.seller.to_string(),
            total_cents: o.total.cents(),
        })
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_count: receipt.order_count(),
            orders,
        }),
    ))
}
