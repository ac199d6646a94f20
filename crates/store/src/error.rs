//! Storage error types.

use common::{BuyerId, ProductId};
use domain::DomainError;
use thiserror::Error;

/// Errors that can occur when interacting with the market store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional stock decrement found the product deleted, missing,
    /// or short of stock. Aborts the whole checkout transaction.
    #[error("Not enough stock for product '{product_name}'")]
    InsufficientStock { product_name: String },

    /// The buyer does not exist.
    #[error("Buyer not found: {0}")]
    BuyerNotFound(BuyerId),

    /// The product does not exist or has been removed from the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The buyer has no cart line for this product.
    #[error("No cart line for product: {0}")]
    CartLineNotFound(ProductId),

    /// A stored value failed domain validation (e.g. an unknown status
    /// string written by another system).
    #[error("Invalid stored value: {0}")]
    Domain(#[from] DomainError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
