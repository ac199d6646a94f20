//! HTTP API server for the marketplace backend.
//!
//! REST endpoints for cart management, checkout, order management and
//! reviews, with structured logging (tracing) and Prometheus metrics.
//! Authentication is upstream: handlers trust the `x-user-id` and
//! `x-user-role` headers the auth layer injects.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::{CartService, CheckoutEngine};
use market_store::MarketStore;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{OrderService, ReviewService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: MarketStore> {
    pub cart: CartService<S>,
    pub checkout: CheckoutEngine<S>,
    pub orders: OrderService<S>,
    pub reviews: ReviewService<S>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: MarketStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout", post(routes::checkout::create::<S>))
        .route("/cart", get(routes::cart::view::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/cart/items/{product_id}",
            axum::routing::delete(routes::cart::remove_item::<S>),
        )
        .route("/orders/history", get(routes::orders::history::<S>))
        .route("/orders/{id}/status", put(routes::orders::update_status::<S>))
        .route("/seller/orders", get(routes::orders::seller_list::<S>))
        .route("/seller/stats", get(routes::orders::stats::<S>))
        .route("/reviews", post(routes::reviews::create::<S>))
        .route(
            "/products/{id}/reviews",
            get(routes::reviews::list::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a store.
pub fn create_default_state<S: MarketStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        cart: CartService::new(store.clone()),
        checkout: CheckoutEngine::new(store.clone()),
        orders: OrderService::new(store.clone()),
        reviews: ReviewService::new(store),
    })
}
