//! Inventory snapshot models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A point-in-time on-hand count for a product
///
/// Reported independently by the inventory subsystem; not derived from
/// summing batch quantities. The two figures are expected to diverge and
/// both are surfaced to retailers for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub product_id: i64,
    pub date: NaiveDate,
    pub quantity: i64,
}
