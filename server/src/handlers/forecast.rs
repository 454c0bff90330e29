//! HTTP handler for the AI demand forecast pass-through

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use shared::DemandForecast;

use crate::error::AppResult;
use crate::AppState;

const DEFAULT_DAYS_AHEAD: u32 = 7;
const MAX_DAYS_AHEAD: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days_ahead: Option<u32>,
}

/// Request an AI demand forecast for a product
pub async fn get_demand_forecast(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<DemandForecast>> {
    let days_ahead = query
        .days_ahead
        .unwrap_or(DEFAULT_DAYS_AHEAD)
        .clamp(1, MAX_DAYS_AHEAD);
    let forecast = state.forecast.demand_forecast(product_id, days_ahead).await?;
    Ok(Json(forecast))
}
