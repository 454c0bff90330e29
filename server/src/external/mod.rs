//! Clients for external services

pub mod forecast;
pub mod marketplace;

pub use forecast::ForecastClient;
pub use marketplace::MarketplaceClient;
