//! WebAssembly module for the FreshMarket platform
//!
//! Provides client-side computation for:
//! - Batch discount pricing
//! - Expiry urgency classification
//! - Days-to-expiry arithmetic
//!
//! The browser UI prices batches locally with the exact same schedule the
//! server uses, without a round trip per render.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript bindings
pub use shared::models::*;
pub use shared::pricing::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

fn instant_from_millis(now_ms: f64) -> Result<DateTime<Utc>, JsValue> {
    DateTime::from_timestamp_millis(now_ms as i64)
        .ok_or_else(|| JsValue::from_str("Invalid timestamp"))
}

/// Discounted price for a base price at the given days-to-expiry
#[wasm_bindgen]
pub fn batch_discounted_price(base_price: f64, days_to_expiry: i32) -> f64 {
    DiscountSchedule::default()
        .price_for(decimal(base_price), i64::from(days_to_expiry))
        .to_f64()
        .unwrap_or(0.0)
}

/// Display label for the expiry urgency at the given days-to-expiry
#[wasm_bindgen]
pub fn expiry_status_label(days_until_expiry: i32) -> String {
    classify_expiry(i64::from(days_until_expiry))
        .label()
        .to_string()
}

/// Days until an ISO-8601 expiry date, relative to a JS timestamp
/// (`Date.now()` milliseconds); negative once expired
#[wasm_bindgen]
pub fn days_until_expiry(expiry_date: &str, now_ms: f64) -> Result<i32, JsValue> {
    let expiry = NaiveDate::parse_from_str(expiry_date, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid expiry date: {}", e)))?;
    let now = instant_from_millis(now_ms)?;
    Ok(days_until(expiry, now) as i32)
}

/// Rounded percentage discount for the "-N%" badge; 0 when undiscounted
#[wasm_bindgen]
pub fn discount_badge_percent(base_price: f64, discounted_price: f64) -> i32 {
    if base_price <= 0.0 {
        return 0;
    }
    ((1.0 - discounted_price / base_price) * 100.0).round() as i32
}

/// Enrich a JSON array of batches with days-to-expiry and discounted price,
/// sorted nearest-expiry first
#[wasm_bindgen]
pub fn enrich_batches_json(batches_json: &str, now_ms: f64) -> Result<String, JsValue> {
    let batches: Vec<ProductBatch> = serde_json::from_str(batches_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid batches JSON: {}", e)))?;
    let now = instant_from_millis(now_ms)?;
    let enriched = enrich_batches(&batches, now, &DiscountSchedule::default());
    serde_json::to_string(&enriched)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}
