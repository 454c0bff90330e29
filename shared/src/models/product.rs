//! Product catalog models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product listed on the marketplace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
}

impl Product {
    /// Display label for the category column
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("Uncategorized")
    }
}

/// A discrete lot of a product with its own dates, price, and stock
///
/// The discounted price of a batch is never stored; it is derived from
/// `base_price` and the evaluation instant by the pricing schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductBatch {
    pub id: i64,
    pub product_id: i64,
    pub manufacture_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub base_price: Decimal,
    /// Remaining units in this batch
    pub quantity: i64,
}

/// A recorded discounted price for a batch on a given day
///
/// Served by the marketplace API for price-history views; the live price is
/// always recomputed, never read from these records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub discounted_price: Decimal,
}
