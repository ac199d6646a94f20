//! Product review entity.

use chrono::{DateTime, Utc};
use common::{BuyerId, ProductId};
use serde::{Deserialize, Serialize};

use crate::rating::Rating;

/// A product review.
///
/// Identity is the (buyer, product) pair: a buyer holds at most one review
/// per product, and resubmitting replaces rating, comment and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub buyer_id: BuyerId,
    pub product_id: ProductId,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
