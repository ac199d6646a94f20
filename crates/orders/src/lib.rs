//! Order management and reviews.
//!
//! Everything that happens to an order after checkout created it: buyer
//! history, seller-scoped listings, status lifecycle transitions, seller
//! dashboard stats, plus the review engine, which unlocks once an order
//! containing the product reaches `delivered`.
//!
//! Orders are dually owned: the buyer reads them, the fulfilling seller
//! manages their status. Every read here filters by whichever identity is
//! acting, and identity is always an explicit parameter.

pub mod error;
pub mod reviews;
pub mod service;

pub use error::{OrderError, ReviewError};
pub use reviews::ReviewService;
pub use service::{Actor, OrderService};
