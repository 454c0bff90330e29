//! Session carts and checkout
//!
//! Carts live in memory, keyed by a session id handed to the browser.
//! Lines are priced with the same schedule the listings show, at the
//! moment the line is added; checkout posts the resulting order to the
//! marketplace API.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use shared::{days_until, ExpiredStockPolicy, Order, SummaryOptions};

use crate::error::{AppError, AppResult};
use crate::external::marketplace::{MarketplaceClient, NewOrder, NewOrderItem};
use crate::services::refresh::SourceLists;

/// One cart line: a quantity of a specific batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: i64,
    pub batch_id: i64,
    pub quantity: i64,
    /// Discounted unit price at the time the line was added
    pub unit_price: Decimal,
}

/// A shopping cart for one browser session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub id: Uuid,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Order total: sum of quantity times unit price over all lines
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| Decimal::from(item.quantity) * item.unit_price)
            .sum()
    }

    pub fn total_units(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Input for adding a line to a cart
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemInput {
    pub product_id: i64,
    pub batch_id: i64,
    pub quantity: i64,
}

/// In-memory cart registry
#[derive(Clone, Default)]
pub struct CartService {
    carts: Arc<Mutex<HashMap<Uuid, Cart>>>,
}

impl CartService {
    /// Open a new empty cart
    pub async fn create(&self, now: DateTime<Utc>) -> Cart {
        let cart = Cart {
            id: Uuid::new_v4(),
            items: Vec::new(),
            created_at: now,
        };
        self.carts.lock().await.insert(cart.id, cart.clone());
        cart
    }

    /// Fetch a cart by id
    pub async fn get(&self, id: Uuid) -> AppResult<Cart> {
        self.carts
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Cart".to_string()))
    }

    /// Add (or top up) a batch line, priced at the current discount
    pub async fn add_item(
        &self,
        id: Uuid,
        lists: &SourceLists,
        input: AddItemInput,
        now: DateTime<Utc>,
        options: &SummaryOptions,
    ) -> AppResult<Cart> {
        if input.quantity < 1 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be at least 1".to_string(),
            });
        }

        let batch = lists
            .batches
            .iter()
            .find(|batch| batch.id == input.batch_id)
            .ok_or_else(|| AppError::NotFound("Product batch".to_string()))?;

        if batch.product_id != input.product_id {
            return Err(AppError::Validation {
                field: "batch_id".to_string(),
                message: "Batch does not belong to the given product".to_string(),
            });
        }

        let days_to_expiry = days_until(batch.expiry_date, now);
        if options.expired_stock == ExpiredStockPolicy::ExcludeExpired && days_to_expiry < 0 {
            return Err(AppError::Validation {
                field: "batch_id".to_string(),
                message: "Expired batches are not orderable".to_string(),
            });
        }

        let unit_price = options.schedule.price_for(batch.base_price, days_to_expiry);

        let mut carts = self.carts.lock().await;
        let cart = carts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Cart".to_string()))?;

        let requested = input.quantity
            + cart
                .items
                .iter()
                .find(|item| item.batch_id == input.batch_id)
                .map(|item| item.quantity)
                .unwrap_or(0);
        if requested > batch.quantity {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: format!(
                    "Requested {} units but only {} remain in the batch",
                    requested, batch.quantity
                ),
            });
        }

        match cart
            .items
            .iter_mut()
            .find(|item| item.batch_id == input.batch_id)
        {
            Some(line) => {
                line.quantity = requested;
                line.unit_price = unit_price;
            }
            None => cart.items.push(CartItem {
                product_id: input.product_id,
                batch_id: input.batch_id,
                quantity: input.quantity,
                unit_price,
            }),
        }

        Ok(cart.clone())
    }

    /// Remove a batch line from a cart
    pub async fn remove_item(&self, id: Uuid, batch_id: i64) -> AppResult<Cart> {
        let mut carts = self.carts.lock().await;
        let cart = carts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Cart".to_string()))?;
        cart.items.retain(|item| item.batch_id != batch_id);
        Ok(cart.clone())
    }

    /// Submit the cart as an order and discard it on success
    pub async fn checkout(
        &self,
        id: Uuid,
        client: &MarketplaceClient,
        now: DateTime<Utc>,
    ) -> AppResult<Order> {
        let cart = self.get(id).await?;
        if cart.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Cart is empty".to_string(),
            });
        }

        let payload = NewOrder {
            date: now.date_naive(),
            total_price: cart.total(),
            items: cart
                .items
                .iter()
                .map(|item| NewOrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.unit_price,
                })
                .collect(),
        };

        // the cart survives a failed submission
        let order = client.create_order(&payload).await?;
        self.carts.lock().await.remove(&id);

        tracing::info!(
            order_id = order.id,
            units = cart.total_units(),
            "Checkout completed"
        );
        Ok(order)
    }
}
