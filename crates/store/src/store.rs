//! The `MarketStore` trait and its supporting types.

use async_trait::async_trait;
use common::{BuyerId, OrderId, ProductId, SellerId};
use domain::{CartSnapshotLine, Money, Order, OrderLine, OrderStatus, Review, SellerRef};

use crate::error::Result;

/// A line item to be written as part of a checkout commit.
///
/// `product_name` and `price_at_purchase` are snapshots taken when the cart
/// was loaded; the name is carried so a failed decrement can report which
/// product ran short without another read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineDraft {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price_at_purchase: Money,
}

/// One order to be created by a checkout commit: a seller partition with
/// its precomputed total and line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub seller: SellerRef,
    pub total: Money,
    pub lines: Vec<OrderLineDraft>,
}

/// Header of an order created by a checkout commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub order_id: OrderId,
    pub seller: SellerRef,
    pub total: Money,
}

/// An order header together with its line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWithLines {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Aggregates for a seller's dashboard, computed over the seller's line
/// items in non-cancelled orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SellerStats {
    pub revenue: Money,
    pub order_count: u64,
    pub customer_count: u64,
    pub product_count: u64,
}

/// Storage operations for the marketplace.
///
/// Implementations must guarantee that [`commit_checkout`] is atomic and
/// that its per-line stock check-and-decrement is isolated against
/// concurrent commits: two checkouts competing for the same stock must
/// serialize, so availability can never be double-spent.
///
/// [`commit_checkout`]: MarketStore::commit_checkout
#[async_trait]
pub trait MarketStore: Send + Sync {
    // -- Cart --

    /// Loads all cart lines for a buyer joined with current product price,
    /// stock, deletion flag and owning seller, in insertion order.
    async fn cart_snapshot(&self, buyer: BuyerId) -> Result<Vec<CartSnapshotLine>>;

    /// Adds `quantity` units of a product to the buyer's cart, merging into
    /// an existing line for the same product if there is one.
    ///
    /// The product must exist and must not be soft-deleted; stock is not
    /// checked here, since checkout re-verifies it at commit time.
    async fn add_cart_line(
        &self,
        buyer: BuyerId,
        product: ProductId,
        quantity: u32,
    ) -> Result<()>;

    /// Removes the buyer's cart line for a product. Fails with
    /// `CartLineNotFound` if the buyer has no such line.
    async fn remove_cart_line(&self, buyer: BuyerId, product: ProductId) -> Result<()>;

    // -- Buyer profile --

    /// Returns the buyer's stored shipping address (possibly blank).
    async fn shipping_address(&self, buyer: BuyerId) -> Result<String>;

    // -- Checkout --

    /// Executes the checkout commit as one atomic unit: creates one order
    /// (status `pending`) plus line items per draft, applies a conditional
    /// stock decrement for every line, and clears the buyer's cart.
    ///
    /// If any decrement cannot be satisfied the whole commit rolls back
    /// with `InsufficientStock` naming the offending product, and the cart
    /// is left exactly as it was. Callers are expected to pass at least
    /// one draft.
    async fn commit_checkout(
        &self,
        buyer: BuyerId,
        drafts: Vec<OrderDraft>,
    ) -> Result<Vec<CreatedOrder>>;

    // -- Orders --

    /// Loads an order header by id.
    async fn get_order(&self, order: OrderId) -> Result<Option<Order>>;

    /// All orders placed by a buyer, newest first, with their lines.
    async fn orders_for_buyer(&self, buyer: BuyerId) -> Result<Vec<OrderWithLines>>;

    /// Every order in the system, newest first. Admin-only surface.
    async fn all_orders(&self) -> Result<Vec<OrderWithLines>>;

    /// Orders containing at least one line item whose product belongs to
    /// the seller, newest first, each with all of its lines.
    async fn orders_for_seller(&self, seller: SellerId) -> Result<Vec<OrderWithLines>>;

    /// Returns true if the order has at least one line item fulfilled by
    /// the seller.
    async fn order_involves_seller(&self, order: OrderId, seller: SellerId) -> Result<bool>;

    /// Atomically moves an order's status from `expected` to `next`.
    ///
    /// Returns false if the order's current status no longer matches
    /// `expected` (a concurrent transition won), leaving the row untouched.
    async fn set_order_status(
        &self,
        order: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool>;

    // -- Reviews --

    /// Returns true if the buyer has a `delivered` order containing the
    /// product. This is the gate for review submission.
    async fn has_delivered_order_containing(
        &self,
        buyer: BuyerId,
        product: ProductId,
    ) -> Result<bool>;

    /// Inserts the review, or replaces rating/comment/timestamp of the
    /// buyer's existing review for the same product, as one atomic upsert.
    async fn upsert_review(&self, review: Review) -> Result<()>;

    /// All reviews for a product, newest first.
    async fn reviews_for_product(&self, product: ProductId) -> Result<Vec<Review>>;

    // -- Stats --

    /// Dashboard aggregates for a seller.
    async fn seller_stats(&self, seller: SellerId) -> Result<SellerStats>;
}
