//! Retailer directory models

use serde::{Deserialize, Serialize};

/// A retailer selling on the marketplace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Retailer {
    pub id: i64,
    pub name: String,
    pub location: String,
}
