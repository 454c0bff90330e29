//! HTTP handlers for the retailer dashboard

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use shared::ProductSummary;

use crate::error::AppResult;
use crate::handlers::require_snapshot;
use crate::services::alerts::PriceChangeAlert;
use crate::services::analytics::{self, DashboardAnalytics};
use crate::services::dashboard;
use crate::services::refresh;
use crate::AppState;

/// Per-product summary rows for the inventory table
pub async fn get_summary(State(state): State<AppState>) -> AppResult<Json<Vec<ProductSummary>>> {
    let snapshot = require_snapshot(&state).await?;
    Ok(Json(dashboard::summary_rows(
        &snapshot,
        Utc::now(),
        &state.options,
    )))
}

/// Summary rows as a CSV download
pub async fn export_summary_csv(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = require_snapshot(&state).await?;
    let rows = dashboard::summary_rows(&snapshot, Utc::now(), &state.options);
    let csv = dashboard::summary_csv(&rows)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory-summary.csv\"",
            ),
        ],
        csv,
    ))
}

/// Overview widgets: category depth, sold vs spoilage, revenue, alerts
pub async fn get_analytics(State(state): State<AppState>) -> AppResult<Json<DashboardAnalytics>> {
    let snapshot = require_snapshot(&state).await?;
    Ok(Json(analytics::analytics(&snapshot, Utc::now())))
}

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub limit: Option<usize>,
}

/// Recent price-change alerts, newest first
pub async fn get_price_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> AppResult<Json<Vec<PriceChangeAlert>>> {
    let limit = query.limit.unwrap_or(20);
    Ok(Json(state.alerts.recent(limit).await))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub refreshed_at: chrono::DateTime<Utc>,
}

/// Force an immediate refresh of the source lists
pub async fn trigger_refresh(State(state): State<AppState>) -> AppResult<Json<RefreshResponse>> {
    let refreshed_at =
        refresh::refresh_now(&state.market, &state.snapshots, &state.alerts, &state.options)
            .await?;
    Ok(Json(RefreshResponse { refreshed_at }))
}
