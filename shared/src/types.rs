//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Location id of the central warehouse
pub const WAREHOUSE_LOCATION: &str = "warehouse";

/// Pseudo-location for goods leaving to (or returning from) a customer
pub const CUSTOMER_LOCATION: &str = "customer";

/// Pseudo-location for goods arriving from a supplier
pub const SUPPLIER_LOCATION: &str = "supplier";

/// Returns true for locations that hold stock records
pub fn is_stock_location(location_id: &str) -> bool {
    location_id != CUSTOMER_LOCATION && location_id != SUPPLIER_LOCATION
}

/// Payment methods accepted at the point of sale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Wallet,
    Voucher,
}

/// Severity attached to audit entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditSeverity {
    #[default]
    Info,
    Warning,
    Critical,
}

/// Date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
