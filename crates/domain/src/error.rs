//! Domain validation errors.

use thiserror::Error;

use crate::status::OrderStatus;

/// Errors raised by domain-level validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Rating outside the 1–5 range.
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// Cart quantity below 1.
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    /// Illegal order status transition.
    #[error("Order cannot move from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Status string not part of the lifecycle.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}
