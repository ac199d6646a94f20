//! Shared identifier types used across every layer of the marketplace
//! backend.

pub mod types;

pub use types::{BuyerId, OrderId, ProductId, SellerId};
