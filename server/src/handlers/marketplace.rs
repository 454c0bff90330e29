//! HTTP handlers for storefront and catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use shared::{DateRange, PricePoint, Product, ProductBatch, Retailer};

use crate::error::AppResult;
use crate::external::marketplace::{NewBatch, NewProduct};
use crate::handlers::require_snapshot;
use crate::services::dashboard::{self, ProductDetail, ProductListing};
use crate::services::refresh;
use crate::AppState;

/// Filters for the storefront listing
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub category: Option<String>,
}

/// Optional date window shared by history-style endpoints
#[derive(Debug, Deserialize)]
pub struct DateWindowQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl DateWindowQuery {
    fn range(&self) -> Option<DateRange> {
        match (self.date_from, self.date_to) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        }
    }
}

/// List products with their current discounted prices
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<ProductListing>>> {
    let snapshot = require_snapshot(&state).await?;
    Ok(Json(dashboard::product_listings(
        &snapshot,
        Utc::now(),
        &state.options,
        query.name.as_deref(),
        query.category.as_deref(),
    )))
}

/// A product with its enriched batches, for the product page
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<ProductDetail>> {
    let snapshot = require_snapshot(&state).await?;
    let detail = dashboard::product_detail(
        &snapshot,
        product_id,
        Utc::now(),
        &state.options,
        &state.thresholds,
    )?;
    Ok(Json(detail))
}

/// Publish a new product and refresh the snapshot
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> AppResult<Json<Product>> {
    let product = state.market.create_product(&input).await?;
    refresh::refresh_now(&state.market, &state.snapshots, &state.alerts, &state.options).await?;
    Ok(Json(product))
}

/// Publish a new batch for a product and refresh the snapshot
pub async fn create_batch(
    State(state): State<AppState>,
    Json(input): Json<NewBatch>,
) -> AppResult<Json<ProductBatch>> {
    let batch = state.market.create_batch(&input).await?;
    refresh::refresh_now(&state.market, &state.snapshots, &state.alerts, &state.options).await?;
    Ok(Json(batch))
}

/// Recorded daily prices for a batch
pub async fn get_price_history(
    State(state): State<AppState>,
    Path(batch_id): Path<i64>,
    Query(window): Query<DateWindowQuery>,
) -> AppResult<Json<Vec<PricePoint>>> {
    let points = state
        .market
        .list_price_history(batch_id, window.range())
        .await?;
    Ok(Json(points))
}

/// Retailer directory
pub async fn list_retailers(State(state): State<AppState>) -> AppResult<Json<Vec<Retailer>>> {
    Ok(Json(state.market.list_retailers().await?))
}
