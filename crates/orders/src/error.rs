//! Order management and review error types.

use common::OrderId;
use domain::DomainError;
use market_store::StoreError;
use thiserror::Error;

/// Errors from order management operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order does not exist.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The acting seller has no line item in this order.
    #[error("You can only manage orders that contain your products")]
    Forbidden,

    /// The requested status move is not part of the lifecycle.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A concurrent transition won; the caller should re-read and retry.
    #[error("Order status changed concurrently")]
    Conflict,

    /// Storage failure.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from review submission.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// No delivered order for this (buyer, product) pair.
    #[error("Reviews are only allowed once an order containing this product is delivered")]
    NotAllowed,

    /// Rating outside 1–5.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
