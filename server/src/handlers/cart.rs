//! HTTP handlers for cart and checkout endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use shared::Order;

use crate::error::AppResult;
use crate::handlers::require_snapshot;
use crate::services::cart::{AddItemInput, Cart};
use crate::services::refresh;
use crate::AppState;

/// Open a new cart session
pub async fn create_cart(State(state): State<AppState>) -> AppResult<Json<Cart>> {
    Ok(Json(state.carts.create(Utc::now()).await))
}

/// Fetch a cart
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> AppResult<Json<Cart>> {
    Ok(Json(state.carts.get(cart_id).await?))
}

/// Add a batch line to a cart, priced at the current discount
pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(input): Json<AddItemInput>,
) -> AppResult<Json<Cart>> {
    let snapshot = require_snapshot(&state).await?;
    let cart = state
        .carts
        .add_item(cart_id, &snapshot.lists, input, Utc::now(), &state.options)
        .await?;
    Ok(Json(cart))
}

/// Remove a batch line from a cart
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((cart_id, batch_id)): Path<(Uuid, i64)>,
) -> AppResult<Json<Cart>> {
    Ok(Json(state.carts.remove_item(cart_id, batch_id).await?))
}

/// Submit the cart as an order, then refresh the snapshot
pub async fn checkout(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = state.carts.checkout(cart_id, &state.market, Utc::now()).await?;

    // checkout mutates upstream state; a stale snapshot would show sold
    // stock as still available
    if let Err(err) =
        refresh::refresh_now(&state.market, &state.snapshots, &state.alerts, &state.options).await
    {
        tracing::warn!("Post-checkout refresh failed: {}", err);
    }

    Ok(Json(order))
}
