//! Buyer and product entities.
//!
//! Catalog CRUD itself is an external collaborator; these types exist
//! because checkout reads them (price, stock, soft-delete flag, owning
//! seller) and order management needs the buyer's role and address.

use common::{BuyerId, ProductId};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::seller::SellerRef;

/// Account role, issued by the upstream auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Sales,
    Admin,
}

impl Role {
    /// Returns the role name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Sales => "sales",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "sales" => Ok(Role::Sales),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A buyer account.
///
/// `shipping_address` may be empty; checkout refuses to run until the buyer
/// fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub id: BuyerId,
    pub full_name: String,
    pub email: String,
    pub shipping_address: String,
    pub role: Role,
}

/// A catalog product as checkout sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller: SellerRef,
    pub name: String,
    pub price: Money,
    pub stock_quantity: u32,
    pub is_deleted: bool,
}

impl Product {
    /// Returns true if this product can fulfil an order for `quantity`
    /// units: not soft-deleted and enough stock on hand.
    ///
    /// A deleted product is never sellable, even with stock remaining.
    pub fn can_fulfill(&self, quantity: u32) -> bool {
        !self.is_deleted && self.stock_quantity >= quantity
    }
}
