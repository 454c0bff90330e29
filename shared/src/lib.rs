//! Shared types and pricing logic for the FreshMarket platform
//!
//! This crate contains the domain records sourced from the marketplace API,
//! the batch-level dynamic pricing core, and the per-product inventory/sales
//! aggregation used by the server and (via WASM) the browser UI.

pub mod models;
pub mod pricing;
pub mod summary;
pub mod types;
pub mod validation;

pub use models::*;
pub use pricing::*;
pub use summary::*;
pub use types::*;
pub use validation::*;
