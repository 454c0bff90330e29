//! Source-list refresh scheduling
//!
//! The aggregation core must never see partial data: a `SourceLists` value
//! can only exist with all four lists present, and the refresh loop swaps a
//! complete snapshot in one step. On fetch failure the previous snapshot
//! stays in place.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

use shared::{summarize_all, InventorySnapshot, Order, Product, ProductBatch, SummaryOptions};

use crate::error::AppResult;
use crate::external::MarketplaceClient;
use crate::services::alerts::AlertLog;

/// The four source lists the aggregator consumes, joined
#[derive(Debug, Clone)]
pub struct SourceLists {
    pub products: Vec<Product>,
    pub batches: Vec<ProductBatch>,
    pub inventories: Vec<InventorySnapshot>,
    pub orders: Vec<Order>,
}

impl SourceLists {
    /// Join all four lists; there is no way to build this value with any
    /// of them missing
    pub fn new(
        products: Vec<Product>,
        batches: Vec<ProductBatch>,
        inventories: Vec<InventorySnapshot>,
        orders: Vec<Order>,
    ) -> Self {
        Self {
            products,
            batches,
            inventories,
            orders,
        }
    }

    /// Fetch all four lists concurrently from the marketplace API
    pub async fn fetch_all(client: &MarketplaceClient) -> AppResult<Self> {
        let (products, batches, inventories, orders) = tokio::try_join!(
            client.list_products(None, None),
            client.list_batches(None),
            client.list_inventories(None, None),
            client.list_orders(None),
        )?;
        Ok(Self::new(products, batches, inventories, orders))
    }
}

/// A complete set of source lists plus the instant it was fetched
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub lists: SourceLists,
    pub fetched_at: DateTime<Utc>,
}

/// Shared holder for the latest snapshot
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    /// The most recently published snapshot, if any fetch has completed
    pub async fn latest(&self) -> Option<Arc<Snapshot>> {
        self.inner.read().await.clone()
    }

    /// Replace the current snapshot
    pub async fn publish(&self, snapshot: Snapshot) {
        *self.inner.write().await = Some(Arc::new(snapshot));
    }
}

/// Fetch, diff for price changes, and publish a fresh snapshot
pub async fn refresh_now(
    client: &MarketplaceClient,
    store: &SnapshotStore,
    alerts: &AlertLog,
    options: &SummaryOptions,
) -> AppResult<DateTime<Utc>> {
    let lists = SourceLists::fetch_all(client).await?;
    let fetched_at = Utc::now();

    let summaries = summarize_all(
        &lists.products,
        &lists.batches,
        &lists.inventories,
        &lists.orders,
        fetched_at,
        options,
    );
    let changes = alerts.record(&summaries, fetched_at).await;
    if changes > 0 {
        tracing::info!(changes, "Detected product price changes");
    }

    store.publish(Snapshot { lists, fetched_at }).await;
    Ok(fetched_at)
}

/// Run the polling refresh loop until the task is dropped
pub async fn run_refresh_loop(
    client: MarketplaceClient,
    store: SnapshotStore,
    alerts: AlertLog,
    options: SummaryOptions,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match refresh_now(&client, &store, &alerts, &options).await {
            Ok(fetched_at) => {
                tracing::debug!(%fetched_at, "Source lists refreshed");
            }
            Err(err) => {
                tracing::warn!("Refresh failed, keeping previous snapshot: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            lists: SourceLists::new(vec![], vec![], vec![], vec![]),
            fetched_at: Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = SnapshotStore::default();
        assert!(tokio_test::block_on(store.latest()).is_none());
    }

    #[test]
    fn test_publish_replaces_snapshot() {
        let store = SnapshotStore::default();
        tokio_test::block_on(async {
            store.publish(empty_snapshot()).await;
            let first = store.latest().await.unwrap();

            let mut next = empty_snapshot();
            next.fetched_at = first.fetched_at + chrono::Duration::seconds(30);
            store.publish(next).await;

            let latest = store.latest().await.unwrap();
            assert!(latest.fetched_at > first.fetched_at);
        });
    }
}
