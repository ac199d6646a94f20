use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{BuyerId, OrderId, ProductId, SellerId};
use domain::{
    Buyer, CartLine, CartSnapshotLine, Money, Order, OrderLine, OrderStatus, Product, Review,
    SellerRef,
};
use tokio::sync::RwLock;

use crate::{
    error::{Result, StoreError},
    store::{CreatedOrder, MarketStore, OrderDraft, OrderWithLines, SellerStats},
};

#[derive(Debug, Default)]
struct MemState {
    buyers: HashMap<BuyerId, Buyer>,
    products: HashMap<ProductId, Product>,
    // Insertion order doubles as the cart's display order.
    cart: Vec<CartLine>,
    orders: Vec<Order>,
    order_lines: HashMap<OrderId, Vec<OrderLine>>,
    reviews: HashMap<(BuyerId, ProductId), Review>,
}

impl MemState {
    fn seller_of(&self, product: ProductId) -> Option<SellerRef> {
        self.products.get(&product).map(|p| p.seller)
    }

    fn line_involves_seller(&self, line: &OrderLine, seller: SellerId) -> bool {
        self.seller_of(line.product_id) == Some(SellerRef::Seller(seller))
    }

    fn with_lines(&self, order: &Order) -> OrderWithLines {
        OrderWithLines {
            order: order.clone(),
            lines: self.order_lines.get(&order.id).cloned().unwrap_or_default(),
        }
    }
}

/// In-memory market store implementation for testing.
///
/// All mutation happens under a single write guard, which gives the same
/// serializability as the PostgreSQL transaction: a checkout commit either
/// applies completely or not at all, and two commits can never interleave
/// on the stock check-and-decrement.
#[derive(Clone, Default)]
pub struct InMemoryMarketStore {
    state: Arc<RwLock<MemState>>,
}

impl InMemoryMarketStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a buyer account.
    pub async fn insert_buyer(&self, buyer: Buyer) {
        self.state.write().await.buyers.insert(buyer.id, buyer);
    }

    /// Inserts a catalog product.
    pub async fn insert_product(&self, product: Product) {
        self.state
            .write()
            .await
            .products
            .insert(product.id, product);
    }

    /// Marks a product soft-deleted and zeroes its stock, the way catalog
    /// deletion does.
    pub async fn soft_delete_product(&self, product: ProductId) {
        if let Some(p) = self.state.write().await.products.get_mut(&product) {
            p.is_deleted = true;
            p.stock_quantity = 0;
        }
    }

    /// Returns the current stock of a product.
    pub async fn stock_of(&self, product: ProductId) -> Option<u32> {
        self.state
            .read()
            .await
            .products
            .get(&product)
            .map(|p| p.stock_quantity)
    }

    /// Returns the buyer's raw cart lines in insertion order.
    pub async fn cart_lines_for(&self, buyer: BuyerId) -> Vec<CartLine> {
        self.state
            .read()
            .await
            .cart
            .iter()
            .filter(|l| l.buyer_id == buyer)
            .cloned()
            .collect()
    }

    /// Returns the total number of orders in the store.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the total number of review rows in the store.
    pub async fn review_count(&self) -> usize {
        self.state.read().await.reviews.len()
    }
}

#[async_trait]
impl MarketStore for InMemoryMarketStore {
    async fn cart_snapshot(&self, buyer: BuyerId) -> Result<Vec<CartSnapshotLine>> {
        let state = self.state.read().await;
        state
            .cart
            .iter()
            .filter(|l| l.buyer_id == buyer)
            .map(|line| {
                let product = state
                    .products
                    .get(&line.product_id)
                    .ok_or(StoreError::ProductNotFound(line.product_id))?;
                Ok(CartSnapshotLine {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    seller: product.seller,
                    unit_price: product.price,
                    stock_quantity: product.stock_quantity,
                    is_deleted: product.is_deleted,
                    quantity: line.quantity,
                })
            })
            .collect()
    }

    async fn add_cart_line(
        &self,
        buyer: BuyerId,
        product: ProductId,
        quantity: u32,
    ) -> Result<()> {
        let mut state = self.state.write().await;

        match state.products.get(&product) {
            None => return Err(StoreError::ProductNotFound(product)),
            Some(p) if p.is_deleted => return Err(StoreError::ProductNotFound(product)),
            Some(_) => {}
        }

        if let Some(line) = state
            .cart
            .iter_mut()
            .find(|l| l.buyer_id == buyer && l.product_id == product)
        {
            line.quantity += quantity;
        } else {
            state.cart.push(CartLine {
                buyer_id: buyer,
                product_id: product,
                quantity,
            });
        }
        Ok(())
    }

    async fn remove_cart_line(&self, buyer: BuyerId, product: ProductId) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.cart.len();
        state
            .cart
            .retain(|l| !(l.buyer_id == buyer && l.product_id == product));

        if state.cart.len() == before {
            return Err(StoreError::CartLineNotFound(product));
        }
        Ok(())
    }

    async fn shipping_address(&self, buyer: BuyerId) -> Result<String> {
        let state = self.state.read().await;
        state
            .buyers
            .get(&buyer)
            .map(|b| b.shipping_address.clone())
            .ok_or(StoreError::BuyerNotFound(buyer))
    }

    async fn commit_checkout(
        &self,
        buyer: BuyerId,
        drafts: Vec<OrderDraft>,
    ) -> Result<Vec<CreatedOrder>> {
        let mut state = self.state.write().await;

        // Validate every decrement before touching anything, so a failure
        // leaves the store byte-for-byte unchanged.
        for line in drafts.iter().flat_map(|d| &d.lines) {
            let ok = state
                .products
                .get(&line.product_id)
                .is_some_and(|p| p.can_fulfill(line.quantity));
            if !ok {
                return Err(StoreError::InsufficientStock {
                    product_name: line.product_name.clone(),
                });
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(drafts.len());

        for draft in &drafts {
            let order_id = OrderId::new();
            state.orders.push(Order {
                id: order_id,
                buyer_id: buyer,
                total: draft.total,
                status: OrderStatus::Pending,
                created_at: now,
            });

            let lines = draft
                .lines
                .iter()
                .map(|line| OrderLine {
                    order_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price_at_purchase: line.price_at_purchase,
                })
                .collect();
            state.order_lines.insert(order_id, lines);

            for line in &draft.lines {
                if let Some(product) = state.products.get_mut(&line.product_id) {
                    product.stock_quantity -= line.quantity;
                }
            }

            created.push(CreatedOrder {
                order_id,
                seller: draft.seller,
                total: draft.total,
            });
        }

        state.cart.retain(|l| l.buyer_id != buyer);
        Ok(created)
    }

    async fn get_order(&self, order: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == order).cloned())
    }

    async fn orders_for_buyer(&self, buyer: BuyerId) -> Result<Vec<OrderWithLines>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| o.buyer_id == buyer)
            .map(|o| state.with_lines(o))
            .collect())
    }

    async fn all_orders(&self) -> Result<Vec<OrderWithLines>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .rev()
            .map(|o| state.with_lines(o))
            .collect())
    }

    async fn orders_for_seller(&self, seller: SellerId) -> Result<Vec<OrderWithLines>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| {
                state
                    .order_lines
                    .get(&o.id)
                    .is_some_and(|lines| {
                        lines.iter().any(|l| state.line_involves_seller(l, seller))
                    })
            })
            .map(|o| state.with_lines(o))
            .collect())
    }

    async fn order_involves_seller(&self, order: OrderId, seller: SellerId) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .order_lines
            .get(&order)
            .is_some_and(|lines| lines.iter().any(|l| state.line_involves_seller(l, seller))))
    }

    async fn set_order_status(
        &self,
        order: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.orders.iter_mut().find(|o| o.id == order) {
            Some(o) if o.status == expected => {
                o.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn has_delivered_order_containing(
        &self,
        buyer: BuyerId,
        product: ProductId,
    ) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.orders.iter().any(|o| {
            o.buyer_id == buyer
                && o.status == OrderStatus::Delivered
                && state
                    .order_lines
                    .get(&o.id)
                    .is_some_and(|lines| lines.iter().any(|l| l.product_id == product))
        }))
    }

    async fn upsert_review(&self, review: Review) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .reviews
            .insert((review.buyer_id, review.product_id), review);
        Ok(())
    }

    async fn reviews_for_product(&self, product: ProductId) -> Result<Vec<Review>> {
        let state = self.state.read().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| r.product_id == product)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn seller_stats(&self, seller: SellerId) -> Result<SellerStats> {
        let state = self.state.read().await;

        let product_count = state
            .products
            .values()
            .filter(|p| p.seller == SellerRef::Seller(seller) && !p.is_deleted)
            .count() as u64;

        let mut revenue = Money::zero();
        let mut order_ids = std::collections::HashSet::new();
        let mut customer_ids = std::collections::HashSet::new();

        for order in &state.orders {
            if order.status == OrderStatus::Cancelled {
                continue;
            }
            let Some(lines) = state.order_lines.get(&order.id) else {
                continue;
            };
            for line in lines {
                if state.line_involves_seller(line, seller) {
                    revenue += line.line_total();
                    order_ids.insert(order.id);
                    customer_ids.insert(order.buyer_id);
                }
            }
        }

        Ok(SellerStats {
            revenue,
            order_count: order_ids.len() as u64,
            customer_count: customer_ids.len() as u64,
            product_count,
        })
    }
}
