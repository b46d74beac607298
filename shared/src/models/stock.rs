//! Stock records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One batch of one product held at one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockUnit {
    pub id: String,
    pub product_id: String,
    pub batch_number: String,
    /// `None` when the batch expiry is not known yet
    pub expiry_date: Option<NaiveDate>,
    pub quantity: u32,
    /// `warehouse` or a branch id
    pub location_id: String,
}

impl StockUnit {
    /// Build a record with the id derived from its (product, batch, location) key
    pub fn new(
        product_id: impl Into<String>,
        batch_number: impl Into<String>,
        location_id: impl Into<String>,
        quantity: u32,
        expiry_date: Option<NaiveDate>,
    ) -> Self {
        let product_id = product_id.into();
        let batch_number = batch_number.into();
        let location_id = location_id.into();
        Self {
            id: stock_unit_id(&product_id, &batch_number, &location_id),
            product_id,
            batch_number,
            expiry_date,
            quantity,
            location_id,
        }
    }

    pub fn matches(&self, product_id: &str, batch_number: &str, location_id: &str) -> bool {
        self.product_id == product_id
            && self.batch_number == batch_number
            && self.location_id == location_id
    }

    /// Days until expiry, negative once expired
    pub fn days_to_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date.map(|d| (d - today).num_days())
    }
}

/// Deterministic stock record id: `{product}:{batch}@{location}`
pub fn stock_unit_id(product_id: &str, batch_number: &str, location_id: &str) -> String {
    format!("{}:{}@{}", product_id, batch_number, location_id)
}
