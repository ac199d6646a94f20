//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::ProductId;
use market_store::MarketStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

#[derive(Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product_id: String,
    pub product_name: String,
    pub seller: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
}

#[derive(Serialize)]
pub struct CartMutationResponse {
    pub message: &'static str,
}

/// GET /cart — the caller's cart joined with current product data.
#[tracing::instrument(skip(state, headers))]
pub async fn view<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<CartLineResponse>>, ApiError> {
    let identity = Identity::from_headers(&headers)?;

    let lines = state.cart.view(identity.buyer()).await?;
    let responses = lines
        .iter()
        .map(|line| CartLineResponse {
            product_id: line.product_id.to_string(),
            product_name: line.product_name.clone(),
            seller: line.seller.to_string(),
            unit_price_cents: line.unit_price.cents(),
            quantity: line.quantity,
            line_total_cents: line.line_total().cents(),
        })
        .collect();

    Ok(Json(responses))
}

/// POST /cart/items — adds units of a product, merging existing lines.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add_item<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartMutationResponse>), ApiError> {
    let identity = Identity::from_headers(&headers)?;

    state
        .cart
        .add_item(
            identity.buyer(),
            ProductId::from_uuid(req.product_id),
            req.quantity,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CartMutationResponse {
            message: "Added to cart",
        }),
    ))
}

/// DELETE /cart/items/:product_id — removes the caller's line for a product.
#[tracing::instrument(skip(state, headers))]
pub async fn remove_item<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CartMutationResponse>, ApiError> {
    let identity = Identity::from_headers(&headers)?;

    state
        .cart
        .remove_item(identity.buyer(), ProductId::from_uuid(product_id))
        .await?;

    Ok(Json(CartMutationResponse {
        message: "Removed from cart",
    }))
}
