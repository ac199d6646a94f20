//! Buyer-facing cart operations.

use common::{BuyerId, ProductId};
use domain::CartSnapshotLine;
use market_store::{MarketStore, StoreError};
use thiserror::Error;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity below 1.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// The product does not exist or has been removed from the catalog.
    #[error("Product is not available")]
    ProductUnavailable(ProductId),

    /// The buyer has no cart line for this product.
    #[error("Item is not in your cart")]
    LineNotFound(ProductId),

    /// Unexpected storage failure.
    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CartError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProductNotFound(id) => CartError::ProductUnavailable(id),
            StoreError::CartLineNotFound(id) => CartError::LineNotFound(id),
            other => CartError::Store(other),
        }
    }
}

/// Cart management for buyers: view, add, remove.
///
/// Stock is not checked on add; availability is only decided at checkout
/// commit time, against live stock.
pub struct CartService<S: MarketStore> {
    store: S,
}

impl<S: MarketStore> CartService<S> {
    /// Creates a new cart service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the buyer's cart joined with current product data.
    #[tracing::instrument(skip(self))]
    pub async fn view(&self, buyer: BuyerId) -> Result<Vec<CartSnapshotLine>, CartError> {
        Ok(self.store.cart_snapshot(buyer).await?)
    }

    /// Adds units of a product to the cart, merging with an existing line
    /// for the same product.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        buyer: BuyerId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        self.store.add_cart_line(buyer, product, quantity).await?;
        Ok(())
    }

    /// Removes the buyer's line for a product.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, buyer: BuyerId, product: ProductId) -> Result<(), CartError> {
        self.store.remove_cart_line(buyer, product).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Buyer, Money, Product, Role, SellerRef};
    use market_store::InMemoryMarketStore;

    async fn setup() -> (CartService<InMemoryMarketStore>, InMemoryMarketStore, BuyerId, ProductId)
    {
        let store = InMemoryMarketStore::new();
        let buyer = Buyer {
            id: BuyerId::new(),
            full_name: "Test Buyer".to_string(),
            email: "buyer@example.com".to_string(),
            shipping_address: "1 Main St".to_string(),
            role: Role::Customer,
        };
        let product = Product {
            id: ProductId::new(),
            seller: SellerRef::Platform,
            name: "Widget".to_string(),
            price: Money::from_cents(1000),
            stock_quantity: 5,
            is_deleted: false,
        };
        let buyer_id = buyer.id;
        let product_id = product.id;
        store.insert_buyer(buyer).await;
        store.insert_product(product).await;
        (CartService::new(store.clone()), store, buyer_id, product_id)
    }

    #[tokio::test]
    async fn test_add_and_view() {
        let (cart, _store, buyer, product) = setup().await;

        cart.add_item(buyer, product, 2).await.unwrap();
        cart.add_item(buyer, product, 1).await.unwrap();

        let lines = cart.view(buyer).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].product_name, "Widget");
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let (cart, store, buyer, product) = setup().await;

        let result = cart.add_item(buyer, product, 0).await;
        assert!(matches!(result, Err(CartError::InvalidQuantity)));
        assert!(store.cart_lines_for(buyer).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_foreign_line_is_not_found() {
        let (cart, store, buyer, product) = setup().await;
        cart.add_item(buyer, product, 1).await.unwrap();

        let other_buyer = BuyerId::new();
        let result = cart.remove_item(other_buyer, product).await;
        assert!(matches!(result, Err(CartError::LineNotFound(_))));
        assert_eq!(store.cart_lines_for(buyer).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_unavailable() {
        let (cart, _store, buyer, _product) = setup().await;

        let result = cart.add_item(buyer, ProductId::new(), 1).await;
        assert!(matches!(result, Err(CartError::ProductUnavailable(_))));
    }
}
