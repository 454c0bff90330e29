//! Error handling for the FreshMarket server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // External service errors
    #[error("Marketplace API error: {0}")]
    Upstream(String),

    #[error("Malformed marketplace payload: {0}")]
    UpstreamData(String),

    #[error("Forecast service error: {0}")]
    ForecastService(String),

    /// No complete set of source lists has been fetched yet
    #[error("Source data not yet available")]
    SnapshotUnavailable,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "MARKETPLACE_API_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::UpstreamData(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "MARKETPLACE_DATA_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::ForecastService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "FORECAST_SERVICE_ERROR".to_string(),
                    message: format!("Forecast service error: {}", msg),
                    field: None,
                },
            ),
            AppError::SnapshotUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "SNAPSHOT_UNAVAILABLE".to_string(),
                    message: "Marketplace data has not been fetched yet; try again shortly"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message: format!("Configuration error: {}", msg),
                    field: None,
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
