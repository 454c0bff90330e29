//! Dashboard and storefront views over the current snapshot
//!
//! Everything here is a pure projection of one snapshot at one instant; the
//! presentation-layer rounding to two decimals happens here and nowhere
//! deeper.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use shared::{
    enrich_batches, summarize_all, ExpiryStatus, ExpiryThresholds, Product, ProductBatch,
    ProductSummary, SummaryOptions,
};

use crate::error::{AppError, AppResult};
use crate::services::refresh::Snapshot;

/// One batch row of the expanded product view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchDetail {
    pub batch: ProductBatch,
    pub days_to_expiry: i64,
    /// Discounted price rounded to 2 decimals for display
    pub discounted_price: Decimal,
    /// Percentage badge, e.g. 20 for "-20%"; 0 when undiscounted
    pub discount_percent: i64,
    pub status: ExpiryStatus,
    pub status_label: &'static str,
}

/// A product with its enriched batch rows
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    pub batches: Vec<BatchDetail>,
}

/// Storefront listing row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductListing {
    pub product: Product,
    pub current_price: Option<Decimal>,
    pub has_expiring_soon: bool,
}

/// Rounded percentage discount of `discounted` off `base`
pub fn discount_percent(base: Decimal, discounted: Decimal) -> i64 {
    if base <= Decimal::ZERO {
        return 0;
    }
    ((Decimal::ONE - discounted / base) * Decimal::from(100))
        .round()
        .to_i64()
        .unwrap_or(0)
}

/// Summary rows for every product in the snapshot
pub fn summary_rows(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    options: &SummaryOptions,
) -> Vec<ProductSummary> {
    summarize_all(
        &snapshot.lists.products,
        &snapshot.lists.batches,
        &snapshot.lists.inventories,
        &snapshot.lists.orders,
        now,
        options,
    )
}

/// Expanded batch view for one product
pub fn product_detail(
    snapshot: &Snapshot,
    product_id: i64,
    now: DateTime<Utc>,
    options: &SummaryOptions,
    thresholds: &ExpiryThresholds,
) -> AppResult<ProductDetail> {
    let product = snapshot
        .lists
        .products
        .iter()
        .find(|product| product.id == product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    let own_batches: Vec<ProductBatch> = snapshot
        .lists
        .batches
        .iter()
        .filter(|batch| batch.product_id == product_id)
        .cloned()
        .collect();

    let batches = enrich_batches(&own_batches, now, &options.schedule)
        .into_iter()
        .map(|enriched| {
            let status = thresholds.classify(enriched.days_to_expiry);
            BatchDetail {
                discounted_price: enriched.discounted_price.round_dp(2),
                discount_percent: discount_percent(
                    enriched.batch.base_price,
                    enriched.discounted_price,
                ),
                days_to_expiry: enriched.days_to_expiry,
                status,
                status_label: status.label(),
                batch: enriched.batch,
            }
        })
        .collect();

    Ok(ProductDetail { product, batches })
}

/// Storefront listings, optionally filtered by name substring and category
pub fn product_listings(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    options: &SummaryOptions,
    name: Option<&str>,
    category: Option<&str>,
) -> Vec<ProductListing> {
    summary_rows(snapshot, now, options)
        .into_iter()
        .filter(|row| match name {
            Some(name) => row
                .product
                .name
                .to_lowercase()
                .contains(&name.to_lowercase()),
            None => true,
        })
        .filter(|row| match category {
            Some(category) => row.product.category.as_deref() == Some(category),
            None => true,
        })
        .map(|row| ProductListing {
            product: row.product,
            current_price: row.current_price,
            has_expiring_soon: row.has_expiring_soon,
        })
        .collect()
}

/// Flat CSV row for the summary export
#[derive(Serialize)]
struct SummaryCsvRow {
    product_id: i64,
    name: String,
    category: String,
    current_price: String,
    total_inventory: i64,
    sum_batch_quantity: i64,
    total_sold: i64,
    expiring_soon: bool,
}

/// Export summary rows as CSV for retailer reconciliation
pub fn summary_csv(rows: &[ProductSummary]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    for row in rows {
        writer
            .serialize(SummaryCsvRow {
                product_id: row.product.id,
                name: row.product.name.clone(),
                category: row.product.category_label().to_string(),
                current_price: row
                    .current_price
                    .map(|price| price.round_dp(2).to_string())
                    .unwrap_or_default(),
                total_inventory: row.total_inventory,
                sum_batch_quantity: row.sum_batch_quantity,
                total_sold: row.total_sold,
                expiring_soon: row.has_expiring_soon,
            })
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV serialization failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV writer failed: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV output was not UTF-8: {}", e)))
}
