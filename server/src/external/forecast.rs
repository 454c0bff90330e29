//! AI demand forecast client
//!
//! Client for the external AI forecasting endpoint. The model itself is
//! opaque; this just shapes its response into the shared forecast records.

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;

use shared::{DailyForecast, DemandForecast, ForecastResult, ForecastRiskLevel};

use crate::config::ForecastConfig;
use crate::error::{AppError, AppResult};

/// Client for the AI demand forecast service
#[derive(Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

/// Forecast API response envelope
#[derive(Debug, Deserialize)]
struct ForecastDto {
    product_id: i64,
    product_name: String,
    category: Option<String>,
    forecast: ForecastBodyDto,
    data_points_analyzed: i64,
    average_daily_sales: f64,
    model_used: String,
}

#[derive(Debug, Deserialize)]
struct ForecastBodyDto {
    daily_forecast: Vec<DailyForecastDto>,
    restock_quantity: i64,
    restock_date: Option<NaiveDate>,
    risk_level: String,
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct DailyForecastDto {
    date: NaiveDate,
    predicted_quantity: i64,
}

impl From<ForecastDto> for DemandForecast {
    fn from(dto: ForecastDto) -> Self {
        DemandForecast {
            product_id: dto.product_id,
            product_name: dto.product_name,
            category: dto.category,
            forecast: ForecastResult {
                daily_forecast: dto
                    .forecast
                    .daily_forecast
                    .into_iter()
                    .map(|day| DailyForecast {
                        date: day.date,
                        predicted_quantity: day.predicted_quantity,
                    })
                    .collect(),
                restock_quantity: dto.forecast.restock_quantity,
                restock_date: dto.forecast.restock_date,
                risk_level: ForecastRiskLevel::parse(&dto.forecast.risk_level),
                reasoning: dto.forecast.reasoning,
            },
            data_points_analyzed: dto.data_points_analyzed,
            average_daily_sales: Decimal::from_f64_retain(dto.average_daily_sales)
                .unwrap_or_default(),
            model_used: dto.model_used,
        }
    }
}

impl ForecastClient {
    /// Create a new forecast client from configuration
    pub fn new(config: &ForecastConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request a demand forecast for a product
    pub async fn demand_forecast(
        &self,
        product_id: i64,
        days_ahead: u32,
    ) -> AppResult<DemandForecast> {
        let url = format!(
            "{}/api/v1/ai/demand-forecast/{}?days_ahead={}",
            self.base_url, product_id, days_ahead
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ForecastService(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Product".to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ForecastService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let dto: ForecastDto = response
            .json()
            .await
            .map_err(|e| AppError::ForecastService(format!("Failed to parse response: {}", e)))?;

        Ok(dto.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_conversion() {
        let dto = ForecastDto {
            product_id: 3,
            product_name: "Spinach".to_string(),
            category: Some("Vegetables".to_string()),
            forecast: ForecastBodyDto {
                daily_forecast: vec![DailyForecastDto {
                    date: NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
                    predicted_quantity: 14,
                }],
                restock_quantity: 40,
                restock_date: None,
                risk_level: "HIGH".to_string(),
                reasoning: "Sales trending up".to_string(),
            },
            data_points_analyzed: 120,
            average_daily_sales: 12.5,
            model_used: "gradient-boost-v2".to_string(),
        };

        let forecast: DemandForecast = dto.into();
        assert_eq!(forecast.forecast.risk_level, ForecastRiskLevel::High);
        assert_eq!(forecast.forecast.daily_forecast.len(), 1);
        assert_eq!(forecast.average_daily_sales.to_string(), "12.5");
    }
}
