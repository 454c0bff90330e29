//! Order history models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A completed marketplace order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub date: NaiveDate,
    pub total_price: Decimal,
    pub items: Vec<OrderItem>,
}

/// A single line of an order, priced at purchase time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: Decimal,
}

impl Order {
    /// Total units across all lines
    pub fn total_units(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
