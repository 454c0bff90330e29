//! Price-change detection
//!
//! Diffs the current prices of consecutive aggregation passes and keeps a
//! bounded log of changes. Detection only; delivering notifications is out
//! of scope for this service.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;

use shared::ProductSummary;

const MAX_ALERTS: usize = 100;

/// A detected change in a product's current price between two refreshes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceChangeAlert {
    pub product_id: i64,
    pub product_name: String,
    pub previous_price: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub detected_at: DateTime<Utc>,
}

#[derive(Default)]
struct AlertLogState {
    last_prices: HashMap<i64, Option<Decimal>>,
    alerts: VecDeque<PriceChangeAlert>,
}

/// Bounded in-memory log of price changes
#[derive(Clone, Default)]
pub struct AlertLog {
    inner: Arc<Mutex<AlertLogState>>,
}

impl AlertLog {
    /// Diff a fresh set of summaries against the previous pass and record
    /// the changes; returns how many were detected
    ///
    /// The first pass only seeds the baseline. Products seen for the first
    /// time produce no alert.
    pub async fn record(&self, summaries: &[ProductSummary], detected_at: DateTime<Utc>) -> usize {
        let mut state = self.inner.lock().await;
        let mut changes = 0;

        for summary in summaries {
            if let Some(previous) = state.last_prices.get(&summary.product.id).copied() {
                if previous != summary.current_price {
                    state.alerts.push_back(PriceChangeAlert {
                        product_id: summary.product.id,
                        product_name: summary.product.name.clone(),
                        previous_price: previous,
                        current_price: summary.current_price,
                        detected_at,
                    });
                    changes += 1;
                }
            }
        }

        state.last_prices = summaries
            .iter()
            .map(|summary| (summary.product.id, summary.current_price))
            .collect();

        while state.alerts.len() > MAX_ALERTS {
            state.alerts.pop_front();
        }

        changes
    }

    /// Most recent alerts, newest first
    pub async fn recent(&self, limit: usize) -> Vec<PriceChangeAlert> {
        let state = self.inner.lock().await;
        state.alerts.iter().rev().take(limit).cloned().collect()
    }
}
