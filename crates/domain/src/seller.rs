//! Seller ownership of a product.

use common::SellerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who fulfils a product: a real seller account or the platform itself.
///
/// Products without an owning seller (created by platform staff) belong to
/// the `Platform` variant. Modelling this as a tagged enum rather than a
/// sentinel id makes a collision between the platform bucket and a real
/// seller unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SellerRef {
    /// Platform-owned product; all such products share one checkout
    /// partition.
    Platform,
    /// Product owned by a registered seller.
    Seller(SellerId),
}

impl SellerRef {
    /// Maps a nullable seller column to the ownership variant.
    pub fn from_db(seller_id: Option<Uuid>) -> Self {
        match seller_id {
            Some(id) => SellerRef::Seller(SellerId::from_uuid(id)),
            None => SellerRef::Platform,
        }
    }

    /// Maps the ownership variant back to a nullable seller column.
    pub fn as_db(&self) -> Option<Uuid> {
        match self {
            SellerRef::Platform => None,
            SellerRef::Seller(id) => Some(id.as_uuid()),
        }
    }

    /// Returns true for platform-owned products.
    pub fn is_platform(&self) -> bool {
        matches!(self, SellerRef::Platform)
    }
}

impl std::fmt::Display for SellerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SellerRef::Platform => write!(f, "platform"),
            SellerRef::Seller(id) => write!(f, "{id}"),
        }
    }
}

impl From<SellerId> for SellerRef {
    fn from(id: SellerId) -> Self {
        SellerRef::Seller(id)
    }
}
