use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BuyerId, OrderId, ProductId, SellerId};
use domain::{CartSnapshotLine, Money, Order, OrderLine, OrderStatus, Rating, Review, SellerRef};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    error::{Result, StoreError},
    store::{CreatedOrder, MarketStore, OrderDraft, OrderWithLines, SellerStats},
};

/// PostgreSQL-backed market store implementation.
#[derive(Clone)]
pub struct PgMarketStore {
    pool: PgPool,
}

impl PgMarketStore {
    /// Creates a new PostgreSQL market store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            buyer_id: BuyerId::from_uuid(row.try_get::<Uuid, _>("buyer_id")?),
            total: Money::from_cents(row.try_get("total_cents")?),
            status: status.parse::<OrderStatus>()?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_review(row: &PgRow) -> Result<Review> {
        let rating: i32 = row.try_get("rating")?;
        Ok(Review {
            buyer_id: BuyerId::from_uuid(row.try_get::<Uuid, _>("buyer_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            rating: Rating::new(rating as u8)?,
            comment: row.try_get("comment")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    /// Fetches line items for a set of orders and groups them by order id.
    async fn lines_for_orders(
        &self,
        order_ids: Vec<Uuid>,
    ) -> Result<HashMap<OrderId, Vec<OrderLine>>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, product_id, quantity, price_at_purchase_cents
            FROM order_lines
            WHERE order_id = ANY($1)
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let line = OrderLine {
                order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
                product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
                quantity: row.try_get::<i32, _>("quantity")? as u32,
                price_at_purchase: Money::from_cents(row.try_get("price_at_purchase_cents")?),
            };
            grouped.entry(line.order_id).or_default().push(line);
        }
        Ok(grouped)
    }

    /// Runs an order-header query and attaches line items to each header.
    async fn collect_orders(&self, rows: Vec<PgRow>) -> Result<Vec<OrderWithLines>> {
        let orders: Vec<Order> = rows
            .iter()
            .map(Self::row_to_order)
            .collect::<Result<_>>()?;

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let mut lines = self.lines_for_orders(ids).await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let lines = lines.remove(&order.id).unwrap_or_default();
                OrderWithLines { order, lines }
            })
            .collect())
    }
}

#[async_trait]
impl MarketStore for PgMarketStore {
    async fn cart_snapshot(&self, buyer: BuyerId) -> Result<Vec<CartSnapshotLine>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id AS product_id, p.name, p.seller_id, p.price_cents,
                   p.stock_quantity, p.is_deleted, c.quantity
            FROM cart_lines c
            JOIN products p ON p.id = c.product_id
            WHERE c.buyer_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(buyer.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CartSnapshotLine {
                    product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
                    product_name: row.try_get("name")?,
                    seller: SellerRef::from_db(row.try_get::<Option<Uuid>, _>("seller_id")?),
                    unit_price: Money::from_cents(row.try_get("price_cents")?),
                    stock_quantity: row.try_get::<i32, _>("stock_quantity")? as u32,
                    is_deleted: row.try_get("is_deleted")?,
                    quantity: row.try_get::<i32, _>("quantity")? as u32,
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
        let is_deleted: Option<bool> =
            sqlx::query_scalar("SELECT is_deleted FROM products WHERE id = $1")
                .bind(product.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        match is_deleted {
            None | Some(true) => return Err(StoreError::ProductNotFound(product)),
            Some(false) => {}
        }

        sqlx::query(
            r#"
            INSERT INTO cart_lines (id, buyer_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (buyer_id, product_id)
            DO UPDATE SET quantity = cart_lines.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(buyer.as_uuid())
        .bind(product.as_uuid())
        .bind(quantity as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_cart_line(&self, buyer: BuyerId, product: ProductId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM cart_lines WHERE buyer_id = $1 AND product_id = $2",
        )
        .bind(buyer.as_uuid())
        .bind(product.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::CartLineNotFound(product));
        }
        Ok(())
    }

    async fn shipping_address(&self, buyer: BuyerId) -> Result<String> {
        sqlx::query_scalar("SELECT shipping_address FROM buyers WHERE id = $1")
            .bind(buyer.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::BuyerNotFound(buyer))
    }

    async fn commit_checkout(
        &self,
        buyer: BuyerId,
        drafts: Vec<OrderDraft>,
    ) -> Result<Vec<CreatedOrder>> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(drafts.len());

        for draft in &drafts {
            let order_id = OrderId::new();
            sqlx::query(
                r#"
                INSERT INTO orders (id, buyer_id, total_cents, status, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id.as_uuid())
            .bind(buyer.as_uuid())
            .bind(draft.total.cents())
            .bind(OrderStatus::Pending.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            for line in &draft.lines {
                sqlx::query(
                    r#"
                    INSERT INTO order_lines (id, order_id, product_id, quantity, price_at_purchase_cents)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(order_id.as_uuid())
                .bind(line.product_id.as_uuid())
                .bind(line.quantity as i32)
                .bind(line.price_at_purchase.cents())
                .execute(&mut *tx)
                .await?;
            }

            created.push(CreatedOrder {
                order_id,
                seller: draft.seller,
                total: draft.total,
            });
        }

        // Conditional decrement: the availability check and the write are a
        // single statement, so concurrent checkouts serialize on the row
        // lock and can never jointly oversell. Zero rows affected means the
        // product is gone, soft-deleted, or short of stock; returning early
        // drops the transaction and rolls everything back.
        for line in drafts.iter().flat_map(|d| &d.lines) {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - $2
                WHERE id = $1 AND is_deleted = FALSE AND stock_quantity >= $2
                "#,
            )
            .bind(line.product_id.as_uuid())
            .bind(line.quantity as i32)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::InsufficientStock {
                    product_name: line.product_name.clone(),
                });
            }
        }

        sqlx::query("DELETE FROM cart_lines WHERE buyer_id = $1")
            .bind(buyer.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(%buyer, orders = created.len(), "checkout commit applied");
        Ok(created)
    }

    async fn get_order(&self, order: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, buyer_id, total_cents, status, created_at FROM orders WHERE id = $1",
        )
        .bind(order.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn orders_for_buyer(&self, buyer: BuyerId) -> Result<Vec<OrderWithLines>> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, total_cents, status, created_at
            FROM orders
            WHERE buyer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(buyer.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        self.collect_orders(rows).await
    }

    async fn all_orders(&self) -> Result<Vec<OrderWithLines>> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, total_cents, status, created_at
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.collect_orders(rows).await
    }

    async fn orders_for_seller(&self, seller: SellerId) -> Result<Vec<OrderWithLines>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT o.id, o.buyer_id, o.total_cents, o.status, o.created_at
            FROM orders o
            JOIN order_lines l ON l.order_id = o.id
            JOIN products p ON p.id = l.product_id
            WHERE p.seller_id = $1
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(seller.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        self.collect_orders(rows).await
    }

    async fn order_involves_seller(&self, order: OrderId, seller: SellerId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM order_lines l
                JOIN products p ON p.id = l.product_id
                WHERE l.order_id = $1 AND p.seller_id = $2
            )
            "#,
        )
        .bind(order.as_uuid())
        .bind(seller.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn set_order_status(
        &self,
        order: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE orders SET status = $3 WHERE id = $1 AND status = $2")
            .bind(order.as_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn has_delivered_order_containing(
        &self,
        buyer: BuyerId,
        product: ProductId,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM orders o
                JOIN order_lines l ON l.order_id = o.id
                WHERE o.buyer_id = $1 AND l.product_id = $2 AND o.status = 'delivered'
            )
            "#,
        )
        .bind(buyer.as_uuid())
        .bind(product.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn upsert_review(&self, review: Review) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, buyer_id, product_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (buyer_id, product_id) DO UPDATE SET
                rating = EXCLUDED.rating,
                comment = EXCLUDED.comment,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(review.buyer_id.as_uuid())
        .bind(review.product_id.as_uuid())
        .bind(review.rating.stars() as i32)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reviews_for_product(&self, product: ProductId) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT buyer_id, product_id, rating, comment, created_at
            FROM reviews
            WHERE product_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(product.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_review).collect()
    }

    async fn seller_stats(&self, seller: SellerId) -> Result<SellerStats> {
        let product_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE seller_id = $1 AND is_deleted = FALSE",
        )
        .bind(seller.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(l.price_at_purchase_cents * l.quantity), 0)::BIGINT AS revenue,
                   COUNT(DISTINCT o.id) AS order_count,
                   COUNT(DISTINCT o.buyer_id) AS customer_count
            FROM order_lines l
            JOIN orders o ON o.id = l.order_id
            JOIN products p ON p.id = l.product_id
            WHERE p.seller_id = $1 AND o.status <> 'cancelled'
            "#,
        )
        .bind(seller.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(SellerStats {
            revenue: Money::from_cents(row.try_get("revenue")?),
            order_count: row.try_get::<i64, _>("order_count")? as u64,
            customer_count: row.try_get::<i64, _>("customer_count")? as u64,
            product_count: product_count as u64,
        })
    }
}
