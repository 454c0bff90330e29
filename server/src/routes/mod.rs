//! Route definitions for the FreshMarket server

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Storefront and catalog
        .nest("/marketplace", marketplace_routes())
        // Retailer dashboard
        .nest("/dashboard", dashboard_routes())
        // Cart and checkout
        .nest("/carts", cart_routes())
        // Retailer subscriptions
        .nest("/users", subscription_routes())
        // AI demand forecast pass-through
        .route(
            "/ai/demand-forecast/:product_id",
            get(handlers::get_demand_forecast),
        )
        // Manual source-list refresh ("Sync Data")
        .route("/refresh", post(handlers::trigger_refresh))
}

/// Storefront routes
fn marketplace_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/:product_id", get(handlers::get_product))
        .route("/batches", post(handlers::create_batch))
        .route(
            "/batches/:batch_id/price-history",
            get(handlers::get_price_history),
        )
        .route("/retailers", get(handlers::list_retailers))
}

/// Retailer dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/summary/export", get(handlers::export_summary_csv))
        .route("/products/:product_id/batches", get(handlers::get_product))
        .route("/analytics", get(handlers::get_analytics))
        .route("/alerts", get(handlers::get_price_alerts))
}

/// Cart routes
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_cart))
        .route("/:cart_id", get(handlers::get_cart))
        .route("/:cart_id/items", post(handlers::add_cart_item))
        .route(
            "/:cart_id/items/:batch_id",
            axum::routing::delete(handlers::remove_cart_item),
        )
        .route("/:cart_id/checkout", post(handlers::checkout))
}

/// Subscription routes
fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:user_id/subscriptions",
            get(handlers::list_subscriptions).post(handlers::subscribe),
        )
        .route(
            "/:user_id/subscriptions/:retailer_id",
            get(handlers::get_subscription_status).delete(handlers::unsubscribe),
        )
}
