//! Domain layer for the marketplace backend.
//!
//! Value objects (`Money`, `Rating`, `SellerRef`, `OrderStatus`) and the
//! entities touched by checkout: cart lines, products, orders with their
//! immutable line items, and reviews. Everything here is storage-agnostic;
//! persistence lives behind the `MarketStore` trait in the store crate.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod rating;
pub mod review;
pub mod seller;
pub mod status;

pub use cart::{CartLine, CartSnapshotLine};
pub use catalog::{Buyer, Product, Role};
pub use error::DomainError;
pub use money::Money;
pub use order::{Order, OrderLine};
pub use rating::Rating;
pub use review::Review;
pub use seller::SellerRef;
pub use status::OrderStatus;
