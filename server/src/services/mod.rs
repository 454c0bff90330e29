//! Business services for the FreshMarket server

pub mod alerts;
pub mod analytics;
pub mod cart;
pub mod dashboard;
pub mod refresh;
pub mod subscription;
