//! Cart entities.

use common::{BuyerId, ProductId};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::seller::SellerRef;

/// One line of a buyer's cart: a product and how many units of it.
///
/// Owned exclusively by the buyer; checkout destroys all of a buyer's lines
/// in bulk once every resulting order is durably created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub buyer_id: BuyerId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A cart line joined with the product fields checkout needs, captured at
/// load time.
///
/// `unit_price` is the price snapshot: order totals and line prices are
/// computed from this value, never from a fresh catalog read, so a price
/// change mid-checkout cannot make an order total disagree with its own
/// lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshotLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub seller: SellerRef,
    pub unit_price: Money,
    pub stock_quantity: u32,
    pub is_deleted: bool,
    pub quantity: u32,
}

impl CartSnapshotLine {
    /// Returns the line total at the snapshotted price.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}
