//! Marketplace API client
//!
//! Typed client for the external marketplace REST service that owns
//! persistence. Raw wire records are validated here and converted into the
//! shared domain types before anything else sees them; invalid records are
//! dropped with a warning rather than failing the whole fetch.

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

use shared::{
    validate_batch, DateRange, InventorySnapshot, Order, OrderItem, PricePoint, Product,
    ProductBatch, Retailer,
};

use crate::config::MarketplaceConfig;
use crate::error::{AppError, AppResult};

/// Client for the external marketplace REST API
#[derive(Clone)]
pub struct MarketplaceClient {
    client: Client,
    base_url: String,
}

/// Payload for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
}

/// Payload for creating a product batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBatch {
    pub product_id: i64,
    pub manufacture_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub base_price: Decimal,
    pub quantity: i64,
}

/// Payload for creating an order at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub date: NaiveDate,
    pub total_price: Decimal,
    pub items: Vec<NewOrderItem>,
}

/// A single line of an order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: Decimal,
}

/// Marketplace API response for a product
#[derive(Debug, Deserialize, Validate)]
struct ProductDto {
    id: i64,
    #[validate(length(min = 1))]
    name: String,
    category: Option<String>,
}

/// Marketplace API response for a product batch
#[derive(Debug, Deserialize, Validate)]
struct BatchDto {
    id: i64,
    product_id: i64,
    manufacture_date: NaiveDate,
    expiry_date: NaiveDate,
    #[validate(range(min = 0.0))]
    base_price: f64,
    #[validate(range(min = 0))]
    quantity: i64,
}

/// Marketplace API response for an inventory snapshot
#[derive(Debug, Deserialize, Validate)]
struct InventoryDto {
    product_id: i64,
    date: NaiveDate,
    #[validate(range(min = 0))]
    quantity: i64,
}

/// Marketplace API response for an order
#[derive(Debug, Deserialize, Validate)]
struct OrderDto {
    id: i64,
    date: NaiveDate,
    #[validate(range(min = 0.0))]
    total_price: f64,
    #[validate]
    items: Vec<OrderItemDto>,
}

/// Marketplace API response for an order line
#[derive(Debug, Deserialize, Validate)]
struct OrderItemDto {
    product_id: i64,
    #[validate(range(min = 0))]
    quantity: i64,
    #[validate(range(min = 0.0))]
    price: f64,
}

/// Marketplace API response for a recorded batch price
#[derive(Debug, Deserialize, Validate)]
struct PricePointDto {
    date: NaiveDate,
    #[validate(range(min = 0.0))]
    discounted_price: f64,
}

/// Marketplace API response for a retailer
#[derive(Debug, Deserialize, Validate)]
struct RetailerDto {
    id: i64,
    #[validate(length(min = 1))]
    name: String,
    location: String,
}

fn money(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        Product {
            id: dto.id,
            name: dto.name,
            category: dto.category,
        }
    }
}

impl From<BatchDto> for ProductBatch {
    fn from(dto: BatchDto) -> Self {
        ProductBatch {
            id: dto.id,
            product_id: dto.product_id,
            manufacture_date: dto.manufacture_date,
            expiry_date: dto.expiry_date,
            base_price: money(dto.base_price),
            quantity: dto.quantity,
        }
    }
}

impl From<InventoryDto> for InventorySnapshot {
    fn from(dto: InventoryDto) -> Self {
        InventorySnapshot {
            product_id: dto.product_id,
            date: dto.date,
            quantity: dto.quantity,
        }
    }
}

impl From<OrderDto> for Order {
    fn from(dto: OrderDto) -> Self {
        Order {
            id: dto.id,
            date: dto.date,
            total_price: money(dto.total_price),
            items: dto
                .items
                .into_iter()
                .map(|item| OrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: money(item.price),
                })
                .collect(),
        }
    }
}

impl From<PricePointDto> for PricePoint {
    fn from(dto: PricePointDto) -> Self {
        PricePoint {
            date: dto.date,
            discounted_price: money(dto.discounted_price),
        }
    }
}

impl From<RetailerDto> for Retailer {
    fn from(dto: RetailerDto) -> Self {
        Retailer {
            id: dto.id,
            name: dto.name,
            location: dto.location,
        }
    }
}

/// Validate a list of wire records and convert the valid ones, dropping the
/// rest with a warning
fn convert_valid<D, T>(dtos: Vec<D>, what: &str) -> Vec<T>
where
    D: Validate,
    T: From<D>,
{
    dtos.into_iter()
        .filter_map(|dto| match dto.validate() {
            Ok(()) => Some(T::from(dto)),
            Err(err) => {
                tracing::warn!("Dropping invalid {} record from marketplace API: {}", what, err);
                None
            }
        })
        .collect()
}

impl MarketplaceClient {
    /// Create a new client from configuration
    pub fn new(config: &MarketplaceConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Request to {} failed: {}", path, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "API returned {} for {}: {}",
                status, path, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamData(format!("Failed to parse {} response: {}", path, e)))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "API returned {} for {}: {}",
                status, path, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamData(format!("Failed to parse {} response: {}", path, e)))
    }

    /// List products, optionally filtered by name substring and category
    pub async fn list_products(
        &self,
        name: Option<&str>,
        category: Option<&str>,
    ) -> AppResult<Vec<Product>> {
        let mut query = Vec::new();
        if let Some(name) = name {
            query.push(("name", name.to_string()));
        }
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        let dtos: Vec<ProductDto> = self.get_json("/api/v1/products/", &query).await?;
        Ok(convert_valid(dtos, "product"))
    }

    /// Fetch a single product
    pub async fn get_product(&self, id: i64) -> AppResult<Product> {
        let dto: ProductDto = self
            .get_json(&format!("/api/v1/products/{}", id), &[])
            .await?;
        dto.validate()
            .map_err(|e| AppError::UpstreamData(format!("Invalid product record: {}", e)))?;
        Ok(dto.into())
    }

    /// List batches, optionally restricted to one product
    pub async fn list_batches(&self, product_id: Option<i64>) -> AppResult<Vec<ProductBatch>> {
        let mut query = Vec::new();
        if let Some(product_id) = product_id {
            query.push(("product_id", product_id.to_string()));
        }
        let dtos: Vec<BatchDto> = self.get_json("/api/v1/product-batches/", &query).await?;
        let batches: Vec<ProductBatch> = convert_valid(dtos, "product batch");
        for batch in &batches {
            // expiry-before-manufacture is upstream data we keep, but it is
            // worth a trace in the logs
            if let Err(err) = validate_batch(batch) {
                tracing::warn!(batch_id = batch.id, "Suspect batch record: {}", err);
            }
        }
        Ok(batches)
    }

    /// List inventory snapshots, optionally restricted by product and dates
    pub async fn list_inventories(
        &self,
        product_id: Option<i64>,
        range: Option<DateRange>,
    ) -> AppResult<Vec<InventorySnapshot>> {
        let mut query = Vec::new();
        if let Some(product_id) = product_id {
            query.push(("product_id", product_id.to_string()));
        }
        if let Some(range) = range {
            query.push(("date_from", range.start.to_string()));
            query.push(("date_to", range.end.to_string()));
        }
        let dtos: Vec<InventoryDto> = self.get_json("/api/v1/inventories/", &query).await?;
        Ok(convert_valid(dtos, "inventory snapshot"))
    }

    /// List orders, optionally restricted by date
    pub async fn list_orders(&self, range: Option<DateRange>) -> AppResult<Vec<Order>> {
        let mut query = Vec::new();
        if let Some(range) = range {
            query.push(("date_from", range.start.to_string()));
            query.push(("date_to", range.end.to_string()));
        }
        let dtos: Vec<OrderDto> = self.get_json("/api/v1/orders/", &query).await?;
        Ok(convert_valid(dtos, "order"))
    }

    /// Recorded daily prices for a batch
    pub async fn list_price_history(
        &self,
        batch_id: i64,
        range: Option<DateRange>,
    ) -> AppResult<Vec<PricePoint>> {
        let mut query = vec![("product_batch_id", batch_id.to_string())];
        if let Some(range) = range {
            query.push(("date_from", range.start.to_string()));
            query.push(("date_to", range.end.to_string()));
        }
        let dtos: Vec<PricePointDto> = self.get_json("/api/v1/product-prices/", &query).await?;
        Ok(convert_valid(dtos, "price point"))
    }

    /// Retailer directory
    pub async fn list_retailers(&self) -> AppResult<Vec<Retailer>> {
        let dtos: Vec<RetailerDto> = self.get_json("/api/v1/retailers/", &[]).await?;
        Ok(convert_valid(dtos, "retailer"))
    }

    /// Publish a new product
    pub async fn create_product(&self, input: &NewProduct) -> AppResult<Product> {
        let dto: ProductDto = self.post_json("/api/v1/products/", input).await?;
        Ok(dto.into())
    }

    /// Publish a new batch for a product
    pub async fn create_batch(&self, input: &NewBatch) -> AppResult<ProductBatch> {
        let dto: BatchDto = self.post_json("/api/v1/product-batches/", input).await?;
        Ok(dto.into())
    }

    /// Submit an order at checkout
    pub async fn create_order(&self, input: &NewOrder) -> AppResult<Order> {
        let dto: OrderDto = self.post_json("/api/v1/orders/", input).await?;
        Ok(dto.into())
    }
}
