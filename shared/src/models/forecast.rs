//! AI demand forecast models
//!
//! The forecast model itself is an external service; these records mirror
//! its response shape for the retailer forecasting views.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Demand forecast for a product, as returned by the AI service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemandForecast {
    pub product_id: i64,
    pub product_name: String,
    pub category: Option<String>,
    pub forecast: ForecastResult,
    pub data_points_analyzed: i64,
    pub average_daily_sales: Decimal,
    pub model_used: String,
}

/// The forecast payload proper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResult {
    pub daily_forecast: Vec<DailyForecast>,
    pub restock_quantity: i64,
    pub restock_date: Option<NaiveDate>,
    pub risk_level: ForecastRiskLevel,
    pub reasoning: String,
}

/// Predicted demand for a single day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub predicted_quantity: i64,
}

/// Stock-out risk level assigned by the forecast model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastRiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl ForecastRiskLevel {
    /// Parse the model's free-form risk string, case-insensitively
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "low" => ForecastRiskLevel::Low,
            "medium" => ForecastRiskLevel::Medium,
            "high" => ForecastRiskLevel::High,
            _ => ForecastRiskLevel::Unknown,
        }
    }
}

impl std::fmt::Display for ForecastRiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastRiskLevel::Low => write!(f, "Low"),
            ForecastRiskLevel::Medium => write!(f, "Medium"),
            ForecastRiskLevel::High => write!(f, "High"),
            ForecastRiskLevel::Unknown => write!(f, "Unknown"),
        }
    }
}
