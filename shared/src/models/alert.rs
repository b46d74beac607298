//! Derived inventory alerts
//!
//! Alerts are never stored. They are recomputed from the current catalog,
//! stock and request state whenever a view asks for them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Product, StockRequest, StockUnit};
use crate::projections::global_quantity;

/// Default expiry look-ahead window in days
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 90;

/// Batches expiring within this many days are at least medium severity
const NEAR_EXPIRY_DAYS: i64 = 30;

/// An alert computed for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    LowStock,
    Expiry,
    Request,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// Low-stock severity: high once the total falls under half the threshold
pub fn classify_low_stock(total: u64, threshold: u32) -> Option<AlertSeverity> {
    let threshold = u64::from(threshold);
    match total {
        t if t >= threshold => None,
        t if t * 2 < threshold => Some(AlertSeverity::High),
        _ => Some(AlertSeverity::Medium),
    }
}

/// Expiry severity for a batch `days_left` days from expiry
pub fn classify_expiry(days_left: i64, window_days: i64) -> Option<AlertSeverity> {
    match days_left {
        d if d < 0 => Some(AlertSeverity::High),
        d if d <= NEAR_EXPIRY_DAYS => Some(AlertSeverity::Medium),
        d if d <= window_days => Some(AlertSeverity::Low),
        _ => None,
    }
}

/// Compute every alert for the current state, most severe first
pub fn derive_alerts(
    products: &[Product],
    stock: &[StockUnit],
    requests: &[StockRequest],
    today: NaiveDate,
    window_days: i64,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for product in products {
        let total = global_quantity(stock, &product.id);

        if let Some(severity) = classify_low_stock(total, product.low_stock_threshold) {
            alerts.push(Alert {
                id: format!("low-stock:{}", product.id),
                kind: AlertKind::LowStock,
                severity,
                message: format!(
                    "{} is low: {} units on hand (threshold {})",
                    product.name, total, product.low_stock_threshold
                ),
                product_id: product.id.clone(),
                location_id: None,
            });
        }
    }

    for unit in stock {
        let Some(days_left) = unit.days_to_expiry(today) else {
            continue;
        };
        let Some(severity) = classify_expiry(days_left, window_days) else {
            continue;
        };

        let name = product_name(products, &unit.product_id);
        let message = if days_left < 0 {
            format!(
                "Batch {} of {} at {} expired {} days ago",
                unit.batch_number, name, unit.location_id, -days_left
            )
        } else {
            format!(
                "Batch {} of {} at {} expires in {} days",
                unit.batch_number, name, unit.location_id, days_left
            )
        };

        alerts.push(Alert {
            id: format!("expiry:{}", unit.id),
            kind: AlertKind::Expiry,
            severity,
            message,
            product_id: unit.product_id.clone(),
            location_id: Some(unit.location_id.clone()),
        });
    }

    for request in requests.iter().filter(|r| r.is_open()) {
        alerts.push(Alert {
            id: format!("request:{}", request.id),
            kind: AlertKind::Request,
            severity: AlertSeverity::Low,
            message: format!(
                "{} requested {} units of {}",
                request.pharmacy_id,
                request.quantity,
                product_name(products, &request.product_id)
            ),
            product_id: request.product_id.clone(),
            location_id: Some(request.pharmacy_id.clone()),
        });
    }

    // Stable sort keeps the derivation order within a severity
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    alerts
}

fn product_name<'a>(products: &'a [Product], product_id: &'a str) -> &'a str {
    products
        .iter()
        .find(|p| p.id == product_id)
        .map(|p| p.name.as_str())
        .unwrap_or(product_id)
}
