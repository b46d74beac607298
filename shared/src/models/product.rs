//! Catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product registered in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    /// Sell price per unit
    pub unit_price: Decimal,
    /// Acquisition cost per unit
    pub unit_cost: Decimal,
    /// Total quantity across all locations below which a low-stock alert fires
    pub low_stock_threshold: u32,
    #[serde(default)]
    pub compliance_status: ComplianceStatus,
}

impl Product {
    /// Gross margin per unit
    pub fn unit_margin(&self) -> Decimal {
        self.unit_price - self.unit_cost
    }
}

/// Regulatory standing of a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    #[default]
    Stable,
    Warning,
    Critical,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceStatus::Stable => write!(f, "Stable"),
            ComplianceStatus::Warning => write!(f, "Warning"),
            ComplianceStatus::Critical => write!(f, "Critical"),
        }
    }
}
