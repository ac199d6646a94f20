//! Order entities.

use chrono::{DateTime, Utc};
use common::{BuyerId, OrderId, ProductId};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::status::OrderStatus;

/// An order header.
///
/// One order is created per (checkout × seller partition). The header and
/// its lines are immutable after creation; only `status` moves, and only
/// through the `OrderStatus` lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: BuyerId,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line item on an order.
///
/// `price_at_purchase` is the immutable price snapshot; later catalog price
/// changes never alter historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Money,
}

impl OrderLine {
    /// Returns quantity × price_at_purchase.
    pub fn line_total(&self) -> Money {
        self.price_at_purchase.multiply(self.quantity)
    }
}
