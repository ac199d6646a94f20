//! The checkout transaction coordinator.

use common::BuyerId;
use market_store::{CreatedOrder, MarketStore};

use crate::error::CheckoutError;
use crate::partition::{materialize, partition_by_seller};

/// What a successful checkout returns: the headers of every order created,
/// one per seller partition, in partition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub orders: Vec<CreatedOrder>,
}

impl CheckoutReceipt {
    /// Number of orders the checkout produced.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

/// Drives a buyer's cart through the checkout transaction.
///
/// The engine performs no speculative work: both user-input checks run
/// before anything opens a transaction, and every mutation happens inside
/// the store's single atomic commit. A failed checkout leaves the cart
/// exactly as it was; retrying is the caller's decision.
pub struct CheckoutEngine<S: MarketStore> {
    store: S,
}

impl<S: MarketStore> CheckoutEngine<S> {
    /// Creates a new checkout engine over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Converts the buyer's cart into one order per seller partition.
    ///
    /// Buyer identity is always an explicit parameter; nothing here reads
    /// ambient request state.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, buyer: BuyerId) -> Result<CheckoutReceipt, CheckoutError> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let start = std::time::Instant::now();

        let result = self.run(buyer).await;

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());
        match &result {
            Ok(receipt) => {
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(%buyer, order_count = receipt.order_count(), "checkout committed");
            }
            Err(err) => {
                metrics::counter!("checkout_failed").increment(1);
                tracing::warn!(%buyer, error = %err, "checkout aborted");
            }
        }
        result
    }

    async fn run(&self, buyer: BuyerId) -> Result<CheckoutReceipt, CheckoutError> {
        let snapshot = self.store.cart_snapshot(buyer).await?;
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let address = self.store.shipping_address(buyer).await?;
        if address.trim().is_empty() {
            return Err(CheckoutError::MissingAddress);
        }

        let drafts = materialize(partition_by_seller(snapshot));
        let orders = self.store.commit_checkout(buyer, drafts).await?;

        Ok(CheckoutReceipt { orders })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Buyer, Money, Product, Role, SellerRef};
    use market_store::InMemoryMarketStore;

    async fn seeded_store(address: &str) -> (InMemoryMarketStore, BuyerId) {
        let store = InMemoryMarketStore::new();
        let buyer = Buyer {
            id: BuyerId::new(),
            full_name: "Test Buyer".to_string(),
            email: "buyer@example.com".to_string(),
            shipping_address: address.to_string(),
            role: Role::Customer,
        };
        let buyer_id = buyer.id;
        store.insert_buyer(buyer).await;
        (store, buyer_id)
    }

    #[tokio::test]
    async fn test_empty_cart_short_circuits() {
        let (store, buyer) = seeded_store("1 Main St").await;
        let engine = CheckoutEngine::new(store);

        let result = engine.checkout(buyer).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_blank_address_rejected_before_any_mutation() {
        let (store, buyer) = seeded_store("   ").await;
        let product = Product {
            id: common::ProductId::new(),
            seller: SellerRef::Platform,
            name: "Widget".to_string(),
            price: Money::from_cents(1000),
            stock_quantity: 5,
            is_deleted: false,
        };
        store.insert_product(product.clone()).await;
        store.add_cart_line(buyer, product.id, 1).await.unwrap();

        let engine = CheckoutEngine::new(store.clone());
        let result = engine.checkout(buyer).await;

        assert!(matches!(result, Err(CheckoutError::MissingAddress)));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.stock_of(product.id).await, Some(5));
        assert_eq!(store.cart_lines_for(buyer).await.len(), 1);
    }
}
