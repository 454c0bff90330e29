//! Validation for records crossing the marketplace API boundary
//!
//! The valuation core itself is total and validates nothing; these checks
//! run where raw API payloads are converted into typed records.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{InventorySnapshot, OrderItem, Product, ProductBatch};

/// A record failed a boundary check
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("product name is empty")]
    EmptyProductName,

    #[error("base price is negative")]
    NegativePrice,

    #[error("quantity is negative")]
    NegativeQuantity,

    #[error("expiry date precedes manufacture date")]
    ExpiryBeforeManufacture,
}

/// Validate a product record
pub fn validate_product(product: &Product) -> Result<(), RecordError> {
    if product.name.trim().is_empty() {
        return Err(RecordError::EmptyProductName);
    }
    Ok(())
}

/// Validate a batch record
///
/// An expiry date before the manufacture date is reported so callers can
/// log it, but upstream data is otherwise taken as-is.
pub fn validate_batch(batch: &ProductBatch) -> Result<(), RecordError> {
    if batch.base_price < Decimal::ZERO {
        return Err(RecordError::NegativePrice);
    }
    if batch.quantity < 0 {
        return Err(RecordError::NegativeQuantity);
    }
    if batch.expiry_date < batch.manufacture_date {
        return Err(RecordError::ExpiryBeforeManufacture);
    }
    Ok(())
}

/// Validate an inventory snapshot record
pub fn validate_snapshot(snapshot: &InventorySnapshot) -> Result<(), RecordError> {
    if snapshot.quantity < 0 {
        return Err(RecordError::NegativeQuantity);
    }
    Ok(())
}

/// Validate an order line
pub fn validate_order_item(item: &OrderItem) -> Result<(), RecordError> {
    if item.quantity < 0 {
        return Err(RecordError::NegativeQuantity);
    }
    if item.price < Decimal::ZERO {
        return Err(RecordError::NegativePrice);
    }
    Ok(())
}
