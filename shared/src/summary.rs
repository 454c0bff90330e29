//! Per-product inventory and sales aggregation
//!
//! A stateless transformation over the four source lists fetched from the
//! marketplace API. Recomputed from scratch on every refresh; holds no
//! state of its own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{InventorySnapshot, Order, Product, ProductBatch};
use crate::pricing::{
    current_price, enrich_batches, DiscountSchedule, EnrichedBatch, ExpiredStockPolicy,
};

/// Knobs for the aggregation pass
///
/// `expiring_soon_within_days` is a third, separate day table: it flags
/// batches for the retailer independently of both the discount schedule and
/// the urgency classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryOptions {
    pub schedule: DiscountSchedule,
    pub expiring_soon_within_days: i64,
    pub expired_stock: ExpiredStockPolicy,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            schedule: DiscountSchedule::default(),
            expiring_soon_within_days: 7,
            expired_stock: ExpiredStockPolicy::default(),
        }
    }
}

/// Derived summary row for one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSummary {
    pub product: Product,
    /// Lowest discounted price across the product's batches; `None` when
    /// the product has no batches
    pub current_price: Option<Decimal>,
    /// Quantity of the most recent inventory snapshot; 0 when none exist
    pub total_inventory: i64,
    /// Sum of all batch quantities, expired batches included
    pub sum_batch_quantity: i64,
    /// Lifetime units sold across all orders
    pub total_sold: i64,
    /// True when any batch is within the expiring-soon window
    pub has_expiring_soon: bool,
}

/// The snapshot with the latest date for a product; the first one wins on a
/// date tie
pub fn latest_snapshot<'a>(
    snapshots: &'a [InventorySnapshot],
    product_id: i64,
) -> Option<&'a InventorySnapshot> {
    snapshots
        .iter()
        .filter(|snap| snap.product_id == product_id)
        .fold(None, |best: Option<&InventorySnapshot>, snap| match best {
            Some(current) if snap.date <= current.date => Some(current),
            _ => Some(snap),
        })
}

/// Lifetime units sold for a product across all orders
pub fn units_sold(orders: &[Order], product_id: i64) -> i64 {
    orders
        .iter()
        .flat_map(|order| order.items.iter())
        .filter(|item| item.product_id == product_id)
        .map(|item| item.quantity)
        .sum()
}

/// Aggregate one product's batches, snapshots, and order history into a
/// summary row
pub fn summarize(
    product: &Product,
    batches: &[ProductBatch],
    snapshots: &[InventorySnapshot],
    orders: &[Order],
    now: DateTime<Utc>,
    options: &SummaryOptions,
) -> ProductSummary {
    let own_batches: Vec<ProductBatch> = batches
        .iter()
        .filter(|batch| batch.product_id == product.id)
        .cloned()
        .collect();
    let enriched = enrich_batches(&own_batches, now, &options.schedule);

    ProductSummary {
        product: product.clone(),
        current_price: current_price(&enriched, options.expired_stock),
        total_inventory: latest_snapshot(snapshots, product.id)
            .map(|snap| snap.quantity)
            .unwrap_or(0),
        sum_batch_quantity: own_batches.iter().map(|batch| batch.quantity).sum(),
        total_sold: units_sold(orders, product.id),
        has_expiring_soon: expiring_soon(&enriched, options.expiring_soon_within_days),
    }
}

/// Summary rows for every product in the catalog
pub fn summarize_all(
    products: &[Product],
    batches: &[ProductBatch],
    snapshots: &[InventorySnapshot],
    orders: &[Order],
    now: DateTime<Utc>,
    options: &SummaryOptions,
) -> Vec<ProductSummary> {
    products
        .iter()
        .map(|product| summarize(product, batches, snapshots, orders, now, options))
        .collect()
}

fn expiring_soon(enriched: &[EnrichedBatch], within_days: i64) -> bool {
    enriched.iter().any(|e| e.days_to_expiry <= within_days)
}
