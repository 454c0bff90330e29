//! FreshMarket - Marketplace Dashboard Server
//!
//! Serves storefront listings, retailer inventory dashboards, carts, and
//! AI-assisted demand forecast views for a perishable-goods marketplace.
//! Persistence and authentication live in the external marketplace API;
//! this server polls it, runs the pricing/valuation core over the fetched
//! lists, and serves the derived views.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared::{ExpiryThresholds, SummaryOptions};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;
mod store;

use external::{ForecastClient, MarketplaceClient};
use services::alerts::AlertLog;
use services::cart::CartService;
use services::refresh::{self, SnapshotStore};
use services::subscription::SubscriptionService;
use store::MemoryKvStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub market: MarketplaceClient,
    pub forecast: ForecastClient,
    pub snapshots: SnapshotStore,
    pub carts: CartService,
    pub subscriptions: SubscriptionService,
    pub alerts: AlertLog,
    pub options: Arc<SummaryOptions>,
    pub thresholds: ExpiryThresholds,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fm_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting FreshMarket server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Marketplace API: {}", config.marketplace.base_url);

    let market = MarketplaceClient::new(&config.marketplace)?;
    let forecast = ForecastClient::new(&config.forecast)?;

    let options = Arc::new(SummaryOptions {
        expiring_soon_within_days: config.valuation.expiring_soon_within_days,
        expired_stock: config.valuation.expired_stock,
        ..SummaryOptions::default()
    });

    let state = AppState {
        market: market.clone(),
        forecast,
        snapshots: SnapshotStore::default(),
        carts: CartService::default(),
        subscriptions: SubscriptionService::new(Arc::new(MemoryKvStore::default())),
        alerts: AlertLog::default(),
        options: options.clone(),
        thresholds: ExpiryThresholds::default(),
    };

    // Prime the snapshot so the first requests do not see a 503; the loop
    // recovers if the API is not up yet
    match refresh::refresh_now(&state.market, &state.snapshots, &state.alerts, &state.options).await
    {
        Ok(_) => tracing::info!("Initial source-list fetch complete"),
        Err(err) => tracing::warn!("Initial source-list fetch failed: {}", err),
    }

    if config.refresh.enabled {
        tracing::info!(
            interval_secs = config.refresh.interval_secs,
            "Starting refresh loop"
        );
        tokio::spawn(refresh::run_refresh_loop(
            market,
            state.snapshots.clone(),
            state.alerts.clone(),
            (*options).clone(),
            config.refresh.interval_secs,
        ));
    }

    // Build application
    let app = create_app(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "FreshMarket API v1.0"
}
