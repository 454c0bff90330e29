//! HTTP handlers for retailer subscriptions

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionsView {
    pub user_id: i64,
    pub retailer_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeInput {
    pub retailer_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatus {
    pub user_id: i64,
    pub retailer_id: i64,
    pub subscribed: bool,
}

/// Retailers a user is subscribed to
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<SubscriptionsView>> {
    Ok(Json(SubscriptionsView {
        user_id,
        retailer_ids: state.subscriptions.subscriptions_for(user_id),
    }))
}

/// Subscribe a user to a retailer
pub async fn subscribe(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(input): Json<SubscribeInput>,
) -> AppResult<Json<SubscriptionsView>> {
    Ok(Json(SubscriptionsView {
        user_id,
        retailer_ids: state.subscriptions.subscribe(user_id, input.retailer_id),
    }))
}

/// Whether a user is subscribed to a retailer, for the subscribe button
pub async fn get_subscription_status(
    State(state): State<AppState>,
    Path((user_id, retailer_id)): Path<(i64, i64)>,
) -> AppResult<Json<SubscriptionStatus>> {
    Ok(Json(SubscriptionStatus {
        user_id,
        retailer_id,
        subscribed: state.subscriptions.is_subscribed(user_id, retailer_id),
    }))
}

/// Unsubscribe a user from a retailer
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path((user_id, retailer_id)): Path<(i64, i64)>,
) -> AppResult<Json<SubscriptionsView>> {
    Ok(Json(SubscriptionsView {
        user_id,
        retailer_ids: state.subscriptions.unsubscribe(user_id, retailer_id),
    }))
}
