//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency; each test
//! truncates the tables, so they are serialized with `serial_test`.
//!
//! ```bash
//! cargo test -p market-store --test postgres_integration
//! ```

use std::sync::Arc;

use common::{BuyerId, ProductId, SellerId};
use domain::{Money, OrderStatus, Rating, Review, SellerRef};
use market_store::{MarketStore, OrderDraft, OrderLineDraft, PgMarketStore, StoreError};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for the schema
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_marketplace_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PgMarketStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE reviews, order_lines, orders, cart_lines, products, buyers")
        .execute(&pool)
        .await
        .unwrap();

    PgMarketStore::new(pool)
}

async fn seed_buyer(store: &PgMarketStore, address: &str) -> BuyerId {
    let id = BuyerId::new();
    sqlx::query(
        "INSERT INTO buyers (id, full_name, email, shipping_address, role) VALUES ($1, $2, $3, $4, 'customer')",
    )
    .bind(id.as_uuid())
    .bind("Test Buyer")
    .bind(format!("{}@example.com", id.as_uuid()))
    .bind(address)
    .execute(store.pool())
    .await
    .unwrap();
    id
}

async fn seed_seller(store: &PgMarketStore) -> SellerId {
    let id = SellerId::new();
    sqlx::query(
        "INSERT INTO buyers (id, full_name, email, shipping_address, role) VALUES ($1, $2, $3, '', 'sales')",
    )
    .bind(id.as_uuid())
    .bind("Test Seller")
    .bind(format!("{}@example.com", id.as_uuid()))
    .execute(store.pool())
    .await
    .unwrap();
    id
}

async fn seed_product(
    store: &PgMarketStore,
    seller: Option<SellerId>,
    name: &str,
    price_cents: i64,
    stock: i32,
) -> ProductId {
    let id = ProductId::new();
    sqlx::query(
        "INSERT INTO products (id, seller_id, name, price_cents, stock_quantity) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id.as_uuid())
    .bind(seller.map(|s| s.as_uuid()))
    .bind(name)
    .bind(price_cents)
    .bind(stock)
    .execute(store.pool())
    .await
    .unwrap();
    id
}

async fn stock_of(store: &PgMarketStore, product: ProductId) -> i32 {
    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
        .bind(product.as_uuid())
        .fetch_one(store.pool())
        .await
        .unwrap()
}

async fn table_count(store: &PgMarketStore, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .unwrap()
}

fn draft(
    seller: SellerRef,
    product: ProductId,
    name: &str,
    price_cents: i64,
    quantity: u32,
) -> OrderDraft {
    OrderDraft {
        seller,
        total: Money::from_cents(price_cents * quantity as i64),
        lines: vec![OrderLineDraft {
            product_id: product,
            product_name: name.to_string(),
            quantity,
            price_at_purchase: Money::from_cents(price_cents),
        }],
    }
}

#[tokio::test]
#[serial]
async fn cart_add_merges_and_snapshot_joins_product_data() {
    let store = get_test_store().await;
    let seller = seed_seller(&store).await;
    let buyer = seed_buyer(&store, "1 Main St").await;
    let product = seed_product(&store, Some(seller), "Widget", 1000, 10).await;

    store.add_cart_line(buyer, product, 2).await.unwrap();
    store.add_cart_line(buyer, product, 3).await.unwrap();

    let snapshot = store.cart_snapshot(buyer).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].quantity, 5);
    assert_eq!(snapshot[0].product_name, "Widget");
    assert_eq!(snapshot[0].unit_price.cents(), 1000);
    assert_eq!(snapshot[0].seller, SellerRef::Seller(seller));
    assert!(!snapshot[0].is_deleted);
}

#[tokio::test]
#[serial]
async fn commit_checkout_writes_orders_decrements_stock_and_clears_cart() {
    let store = get_test_store().await;
    let buyer = seed_buyer(&store, "1 Main St").await;
    let product = seed_product(&store, None, "Widget", 1000, 10).await;
    store.add_cart_line(buyer, product, 4).await.unwrap();

    let created = store
        .commit_checkout(
            buyer,
            vec![draft(SellerRef::Platform, product, "Widget", 1000, 4)],
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].total.cents(), 4000);
    assert_eq!(stock_of(&store, product).await, 6);
    assert!(store.cart_snapshot(buyer).await.unwrap().is_empty());

    let order = store.get_order(created[0].order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.buyer_id, buyer);

    let history = store.orders_for_buyer(buyer).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].lines.len(), 1);
    assert_eq!(history[0].lines[0].price_at_purchase.cents(), 1000);
}

#[tokio::test]
#[serial]
async fn insufficient_stock_rolls_back_the_whole_transaction() {
    let store = get_test_store().await;
    let buyer = seed_buyer(&store, "1 Main St").await;
    let plentiful = seed_product(&store, None, "Plentiful", 100, 50).await;
    let scarce = seed_product(&store, None, "Scarce", 100, 1).await;
    store.add_cart_line(buyer, plentiful, 1).await.unwrap();
    store.add_cart_line(buyer, scarce, 2).await.unwrap();

    let result = store
        .commit_checkout(
            buyer,
            vec![
                draft(SellerRef::Platform, plentiful, "Plentiful", 100, 1),
                draft(SellerRef::Platform, scarce, "Scarce", 100, 2),
            ],
        )
        .await;

    match result {
        Err(StoreError::InsufficientStock { product_name }) => {
            assert_eq!(product_name, "Scarce");
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Nothing observable survives the rollback.
    assert_eq!(table_count(&store, "orders").await, 0);
    assert_eq!(table_count(&store, "order_lines").await, 0);
    assert_eq!(stock_of(&store, plentiful).await, 50);
    assert_eq!(stock_of(&store, scarce).await, 1);
    assert_eq!(store.cart_snapshot(buyer).await.unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn soft_deleted_product_fails_the_decrement_despite_stock() {
    let store = get_test_store().await;
    let buyer = seed_buyer(&store, "1 Main St").await;
    let product = seed_product(&store, None, "Ghost", 100, 10).await;
    store.add_cart_line(buyer, product, 1).await.unwrap();

    sqlx::query("UPDATE products SET is_deleted = TRUE WHERE id = $1")
        .bind(product.as_uuid())
        .execute(store.pool())
        .await
        .unwrap();

    let result = store
        .commit_checkout(
            buyer,
            vec![draft(SellerRef::Platform, product, "Ghost", 100, 1)],
        )
        .await;

    assert!(matches!(result, Err(StoreError::InsufficientStock { .. })));
    assert_eq!(table_count(&store, "orders").await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn concurrent_commits_cannot_oversell_the_same_stock() {
    let store = get_test_store().await;
    let product = seed_product(&store, None, "Last Unit", 1000, 3).await;
    let buyer_a = seed_buyer(&store, "1 Main St").await;
    let buyer_b = seed_buyer(&store, "2 Side St").await;
    store.add_cart_line(buyer_a, product, 3).await.unwrap();
    store.add_cart_line(buyer_b, product, 3).await.unwrap();

    let store_a = store.clone();
    let store_b = store.clone();
    let (result_a, result_b) = tokio::join!(
        tokio::spawn(async move {
            store_a
                .commit_checkout(
                    buyer_a,
                    vec![draft(SellerRef::Platform, product, "Last Unit", 1000, 3)],
                )
                .await
        }),
        tokio::spawn(async move {
            store_b
                .commit_checkout(
                    buyer_b,
                    vec![draft(SellerRef::Platform, product, "Last Unit", 1000, 3)],
                )
                .await
        }),
    );
    let results = [result_a.unwrap(), result_b.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert_eq!(stock_of(&store, product).await, 0);
    assert_eq!(table_count(&store, "orders").await, 1);
}

#[tokio::test]
#[serial]
async fn status_compare_and_set_rejects_stale_expectations() {
    let store = get_test_store().await;
    let buyer = seed_buyer(&store, "1 Main St").await;
    let product = seed_product(&store, None, "Widget", 1000, 10).await;
    store.add_cart_line(buyer, product, 1).await.unwrap();
    let created = store
        .commit_checkout(
            buyer,
            vec![draft(SellerRef::Platform, product, "Widget", 1000, 1)],
        )
        .await
        .unwrap();
    let order_id = created[0].order_id;

    assert!(
        store
            .set_order_status(order_id, OrderStatus::Pending, OrderStatus::Shipped)
            .await
            .unwrap()
    );
    assert!(
        !store
            .set_order_status(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap()
    );

    let order = store.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
#[serial]
async fn review_upsert_never_leaves_two_rows_for_one_pair() {
    let store = get_test_store().await;
    let seller = seed_seller(&store).await;
    let buyer = seed_buyer(&store, "1 Main St").await;
    let product = seed_product(&store, Some(seller), "Widget", 1000, 10).await;

    let review = Review {
        buyer_id: buyer,
        product_id: product,
        rating: Rating::new(2).unwrap(),
        comment: "meh".to_string(),
        created_at: chrono::Utc::now(),
    };
    store.upsert_review(review.clone()).await.unwrap();
    store
        .upsert_review(Review {
            rating: Rating::new(5).unwrap(),
            comment: "grew on me".to_string(),
            ..review
        })
        .await
        .unwrap();

    assert_eq!(table_count(&store, "reviews").await, 1);
    let reviews = store.reviews_for_product(product).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating.stars(), 5);
    assert_eq!(reviews[0].comment, "grew on me");
}

#[tokio::test]
#[serial]
async fn duplicate_review_insert_violates_the_constraint() {
    let store = get_test_store().await;
    let buyer = seed_buyer(&store, "1 Main St").await;
    let seller = seed_seller(&store).await;
    let product = seed_product(&store, Some(seller), "Widget", 1000, 10).await;

    // Bypass the upsert to prove the schema itself refuses duplicates.
    let insert = "INSERT INTO reviews (id, buyer_id, product_id, rating, comment, created_at) VALUES ($1, $2, $3, 4, '', NOW())";
    sqlx::query(insert)
        .bind(Uuid::new_v4())
        .bind(buyer.as_uuid())
        .bind(product.as_uuid())
        .execute(store.pool())
        .await
        .unwrap();
    let second = sqlx::query(insert)
        .bind(Uuid::new_v4())
        .bind(buyer.as_uuid())
        .bind(product.as_uuid())
        .execute(store.pool())
        .await;

    assert!(second.is_err());
    assert_eq!(table_count(&store, "reviews").await, 1);
}

#[tokio::test]
#[serial]
async fn delivered_gate_and_seller_scoping() {
    let store = get_test_store().await;
    let seller = seed_seller(&store).await;
    let other_seller = seed_seller(&store).await;
    let buyer = seed_buyer(&store, "1 Main St").await;
    let product = seed_product(&store, Some(seller), "Widget", 1000, 10).await;
    store.add_cart_line(buyer, product, 2).await.unwrap();

    let created = store
        .commit_checkout(
            buyer,
            vec![draft(SellerRef::Seller(seller), product, "Widget", 1000, 2)],
        )
        .await
        .unwrap();
    let order_id = created[0].order_id;

    assert!(store.order_involves_seller(order_id, seller).await.unwrap());
    assert!(
        !store
            .order_involves_seller(order_id, other_seller)
            .await
            .unwrap()
    );
    assert_eq!(store.orders_for_seller(seller).await.unwrap().len(), 1);
    assert_eq!(store.orders_for_seller(other_seller).await.unwrap().len(), 0);

    assert!(
        !store
            .has_delivered_order_containing(buyer, product)
            .await
            .unwrap()
    );
    store
        .set_order_status(order_id, OrderStatus::Pending, OrderStatus::Shipped)
        .await
        .unwrap();
    store
        .set_order_status(order_id, OrderStatus::Shipped, OrderStatus::Delivered)
        .await
        .unwrap();
    assert!(
        store
            .has_delivered_order_containing(buyer, product)
            .await
            .unwrap()
    );

    let stats = store.seller_stats(seller).await.unwrap();
    assert_eq!(stats.revenue.cents(), 2000);
    assert_eq!(stats.order_count, 1);
    assert_eq!(stats.customer_count, 1);
    assert_eq!(stats.product_count, 1);
}
