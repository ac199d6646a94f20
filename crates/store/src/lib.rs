//! Storage layer for the marketplace backend.
//!
//! The [`MarketStore`] trait is the seam between the domain services and
//! persistence. Every operation that must be atomic across tables (the
//! checkout commit, the conditional stock decrement, the review upsert,
//! the status compare-and-set) lives behind this trait so that the
//! PostgreSQL implementation and the in-memory test double give the same
//! isolation guarantees.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryMarketStore;
pub use postgres::PgMarketStore;
pub use store::{
    CreatedOrder, MarketStore, OrderDraft, OrderLineDraft, OrderWithLines, SellerStats,
};
