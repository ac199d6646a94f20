//! Order management endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use domain::OrderStatus;
use market_store::{MarketStore, OrderWithLines};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub product_id: String,
    pub quantity: u32,
    pub price_at_purchase_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub buyer_id: String,
    pub total_cents: i64,
    pub status: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Serialize)]
pub struct StatusUpdateResponse {
    pub id: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct SellerStatsResponse {
    pub revenue_cents: i64,
    pub order_count: u64,
    pub customer_count: u64,
    pub product_count: u64,
}

impl From<&OrderWithLines> for OrderResponse {
    fn from(owl: &OrderWithLines) -> Self {
        OrderResponse {
            id: owl.order.id.to_string(),
            buyer_id: owl.order.buyer_id.to_string(),
            total_cents: owl.order.total.cents(),
            status: owl.order.status.to_string(),
            created_at: owl.order.created_at.to_rfc3339(),
            lines: owl
                .lines
                .iter()
                .map(|line| OrderLineResponse {
                    product_id: line.product_id.to_string(),
                    quantity: line.quantity,
                    price_at_purchase_cents: line.price_at_purchase.cents(),
                })
                .collect(),
        }
    }
}

/// GET /orders/history — the caller's purchase history.
#[tracing::instrument(skip(state, headers))]
pub async fn history<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let identity = Identity::from_headers(&headers)?;

    let orders = state.orders.history(identity.buyer()).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /seller/orders — orders containing the seller's products
/// (admins see every order).
#[tracing::instrument(skip(state, headers))]
pub async fn seller_list<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let identity = Identity::from_headers(&headers)?;
    let actor = identity.actor()?;

    let orders = state.orders.orders_for_actor(actor).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// PUT /orders/:id/status — moves an order along its lifecycle.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_status<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<StatusUpdateResponse>, ApiError> {
    let identity = Identity::from_headers(&headers)?;
    let actor = identity.actor()?;

    let next = req
        .status
        .parse::<OrderStatus>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let order = state
        .orders
        .update_status(actor, common::OrderId::from_uuid(id), next)
        .await?;

    Ok(Json(StatusUpdateResponse {
        id: order.id.to_string(),
        status: order.status.to_string(),
    }))
}

/// GET /seller/stats — dashboard aggregates for the acting seller.
#[tracing::instrument(skip(state, headers))]
pub async fn stats<S: MarketStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<SellerStatsResponse>, ApiError> {
    let identity = Identity::from_headers(&headers)?;
    let seller = identity.seller()?;

    let stats = state.orders.stats(seller).await?;
    Ok(Json(SellerStatsResponse {
        revenue_cents: stats.revenue.cents(),
        order_count: stats.order_count,
        customer_count: stats.customer_count,
        product_count: stats.product_count,
    }))
}
