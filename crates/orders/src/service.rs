//! Order management service.

use common::{BuyerId, OrderId, SellerId};
use domain::{DomainError, Order, OrderStatus};
use market_store::{MarketStore, OrderWithLines, SellerStats};

use crate::error::OrderError;

/// Who is acting on the order-management surface.
///
/// Admins see and manage everything; sellers only orders that contain at
/// least one of their products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin,
    Seller(SellerId),
}

/// Post-checkout order operations.
///
/// Status is the only mutable field of an order, and it only moves along
/// the lifecycle; totals and line items are immutable from creation.
pub struct OrderService<S: MarketStore> {
    store: S,
}

impl<S: MarketStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// A buyer's purchase history, newest first, with line items.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, buyer: BuyerId) -> Result<Vec<OrderWithLines>, OrderError> {
        Ok(self.store.orders_for_buyer(buyer).await?)
    }

    /// Orders visible to the actor: everything for admins, only orders
    /// containing the seller's products for sellers.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_actor(&self, actor: Actor) -> Result<Vec<OrderWithLines>, OrderError> {
        let orders = match actor {
            Actor::Admin => self.store.all_orders().await?,
            Actor::Seller(seller) => self.store.orders_for_seller(seller).await?,
        };
        Ok(orders)
    }

    /// Moves an order's status one step along the lifecycle.
    ///
    /// Sellers may only touch orders they fulfil. The write is a
    /// compare-and-set on the status read here, so a concurrent transition
    /// surfaces as `Conflict` rather than a lost update.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        actor: Actor,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if let Actor::Seller(seller) = actor
            && !self.store.order_involves_seller(order_id, seller).await?
        {
            return Err(OrderError::Forbidden);
        }

        if !order.status.can_transition_to(next) {
            return Err(OrderError::Domain(DomainError::InvalidStatusTransition {
                from: order.status,
                to: next,
            }));
        }

        if !self
            .store
            .set_order_status(order_id, order.status, next)
            .await?
        {
            return Err(OrderError::Conflict);
        }

        tracing::info!(%order_id, from = %order.status, to = %next, "order status updated");
        Ok(Order {
            status: next,
            ..order
        })
    }

    /// Dashboard aggregates for a seller.
    #[tracing::instrument(skip(self))]
    pub async fn stats(&self, seller: SellerId) -> Result<SellerStats, OrderError> {
        Ok(self.store.seller_stats(seller).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Buyer, Money, Product, Role, SellerRef};
    use market_store::{InMemoryMarketStore, OrderDraft, OrderLineDraft};

    async fn placed_order(
        store: &InMemoryMarketStore,
        seller: SellerId,
    ) -> (BuyerId, OrderId) {
        let buyer = Buyer {
            id: BuyerId::new(),
            full_name: "Test Buyer".to_string(),
            email: format!("{}@example.com", BuyerId::new()),
            shipping_address: "1 Main St".to_string(),
            role: Role::Customer,
        };
        let product = Product {
            id: common::ProductId::new(),
            seller: SellerRef::Seller(seller),
            name: "Widget".to_string(),
            price: Money::from_cents(1000),
            stock_quantity: 10,
            is_deleted: false,
        };
        store.insert_buyer(buyer.clone()).await;
        store.insert_product(product.clone()).await;
        store.add_cart_line(buyer.id, product.id, 1).await.unwrap();

        let created = store
            .commit_checkout(
                buyer.id,
                vec![OrderDraft {
                    seller: product.seller,
                    total: product.price,
                    lines: vec![OrderLineDraft {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        quantity: 1,
                        price_at_purchase: product.price,
                    }],
                }],
            )
            .await
            .unwrap();

        (buyer.id, created[0].order_id)
    }

    #[tokio::test]
    async fn test_seller_advances_own_order() {
        let store = InMemoryMarketStore::new();
        let seller = SellerId::new();
        let (_, order_id) = placed_order(&store, seller).await;
        let service = OrderService::new(store);

        let order = service
            .update_status(Actor::Seller(seller), order_id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);

        let order = service
            .update_status(Actor::Seller(seller), order_id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_foreign_seller_is_forbidden() {
        let store = InMemoryMarketStore::new();
        let (_, order_id) = placed_order(&store, SellerId::new()).await;
        let service = OrderService::new(store);

        let result = service
            .update_status(Actor::Seller(SellerId::new()), order_id, OrderStatus::Shipped)
            .await;
        assert!(matches!(result, Err(OrderError::Forbidden)));
    }

    #[tokio::test]
    async fn test_admin_may_touch_any_order() {
        let store = InMemoryMarketStore::new();
        let (_, order_id) = placed_order(&store, SellerId::new()).await;
        let service = OrderService::new(store);

        let order = service
            .update_status(Actor::Admin, order_id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected() {
        let store = InMemoryMarketStore::new();
        let seller = SellerId::new();
        let (_, order_id) = placed_order(&store, seller).await;
        let service = OrderService::new(store);

        let result = service
            .update_status(Actor::Admin, order_id, OrderStatus::Delivered)
            .await;
        assert!(matches!(
            result,
            Err(OrderError::Domain(DomainError::InvalidStatusTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_terminal_order_admits_nothing() {
        let store = InMemoryMarketStore::new();
        let (_, order_id) = placed_order(&store, SellerId::new()).await;
        let service = OrderService::new(store);

        service
            .update_status(Actor::Admin, order_id, OrderStatus::Cancelled)
            .await
            .unwrap();
        let result = service
            .update_status(Actor::Admin, order_id, OrderStatus::Shipped)
            .await;
        assert!(matches!(result, Err(OrderError::Domain(_))));
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let store = InMemoryMarketStore::new();
        let service = OrderService::new(store);

        let result = service
            .update_status(Actor::Admin, OrderId::new(), OrderStatus::Shipped)
            .await;
        assert!(matches!(result, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_listings_are_scoped_to_the_actor() {
        let store = InMemoryMarketStore::new();
        let seller_a = SellerId::new();
        let seller_b = SellerId::new();
        let (buyer_a, _) = placed_order(&store, seller_a).await;
        placed_order(&store, seller_b).await;
        let service = OrderService::new(store);

        assert_eq!(service.orders_for_actor(Actor::Admin).await.unwrap().len(), 2);
        assert_eq!(
            service
                .orders_for_actor(Actor::Seller(seller_a))
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(service.history(buyer_a).await.unwrap().len(), 1);
    }
}
