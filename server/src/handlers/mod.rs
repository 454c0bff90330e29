//! HTTP handlers for the FreshMarket server

mod cart;
mod dashboard;
mod forecast;
mod health;
mod marketplace;
mod subscriptions;

pub use cart::*;
pub use dashboard::*;
pub use forecast::*;
pub use health::*;
pub use marketplace::*;
pub use subscriptions::*;

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::services::refresh::Snapshot;
use crate::AppState;

/// The latest snapshot, or a 503 while the first fetch is still pending
pub(crate) async fn require_snapshot(state: &AppState) -> AppResult<Arc<Snapshot>> {
    state
        .snapshots
        .latest()
        .await
        .ok_or(AppError::SnapshotUnavailable)
}
