//! WebAssembly module for the Pharmacy Inventory platform
//!
//! Lets the browser run the same ledger logic as the server:
//! - Optimistic application of a transaction to a stock snapshot
//! - Alert derivation for the dashboard
//! - Cart totals at the register
//!
//! All inputs and outputs are JSON strings in the server's wire format.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{LedgerPolicy, PricedLine};

/// Apply a transaction to a stock snapshot, returning the ledger outcome
/// (`stock`, `transaction`, `applied`, `anomalies`) as JSON
#[wasm_bindgen]
pub fn apply_transaction_json(
    stock_json: &str,
    transaction_json: &str,
    confirmed_at: &str,
    restock_shelf_life_days: i32,
) -> Result<String, JsValue> {
    apply_transaction_inner(stock_json, transaction_json, confirmed_at, restock_shelf_life_days)
        .map_err(|e| JsValue::from_str(&e))
}

/// Derive alerts, most severe first
#[wasm_bindgen]
pub fn derive_alerts_json(
    products_json: &str,
    stock_json: &str,
    requests_json: &str,
    today: &str,
    window_days: i32,
) -> Result<String, JsValue> {
    derive_alerts_inner(products_json, stock_json, requests_json, today, window_days)
        .map_err(|e| JsValue::from_str(&e))
}

/// Compute cart totals for `[{stock_unit_id, quantity}]` lines
#[wasm_bindgen]
pub fn cart_totals_json(
    products_json: &str,
    stock_json: &str,
    lines_json: &str,
    discount: &str,
    tax_rate: &str,
) -> Result<String, JsValue> {
    cart_totals_inner(products_json, stock_json, lines_json, discount, tax_rate)
        .map_err(|e| JsValue::from_str(&e))
}

/// Loyalty points a sale would earn; 0 for an unparseable price
#[wasm_bindgen]
pub fn loyalty_points_for_sale(unit_price: &str, quantity: u32) -> u32 {
    Decimal::from_str(unit_price)
        .map(|price| shared::loyalty_points(price, quantity))
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct CartLine {
    stock_unit_id: String,
    quantity: u32,
}

fn parse<T: for<'de> Deserialize<'de>>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn parse_decimal(what: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value).map_err(|e| format!("Invalid {}: {}", what, e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn apply_transaction_inner(
    stock_json: &str,
    transaction_json: &str,
    confirmed_at: &str,
    restock_shelf_life_days: i32,
) -> Result<String, String> {
    let stock: Vec<StockUnit> = parse("stock", stock_json)?;
    let transaction: Transaction = parse("transaction", transaction_json)?;
    let confirmed_at = DateTime::parse_from_rfc3339(confirmed_at)
        .map_err(|e| format!("Invalid timestamp: {}", e))?
        .with_timezone(&Utc);
    let policy = LedgerPolicy {
        restock_shelf_life_days: i64::from(restock_shelf_life_days),
    };

    let outcome = shared::apply_transaction(stock, transaction, confirmed_at, &policy);
    to_json(&outcome)
}

fn derive_alerts_inner(
    products_json: &str,
    stock_json: &str,
    requests_json: &str,
    today: &str,
    window_days: i32,
) -> Result<String, String> {
    let products: Vec<Product> = parse("products", products_json)?;
    let stock: Vec<StockUnit> = parse("stock", stock_json)?;
    let requests: Vec<StockRequest> = parse("requests", requests_json)?;
    let today = NaiveDate::parse_from_str(today, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date: {}", e))?;

    let alerts = shared::derive_alerts(&products, &stock, &requests, today, i64::from(window_days));
    to_json(&alerts)
}

fn cart_totals_inner(
    products_json: &str,
    stock_json: &str,
    lines_json: &str,
    discount: &str,
    tax_rate: &str,
) -> Result<String, String> {
    let products: Vec<Product> = parse("products", products_json)?;
    let stock: Vec<StockUnit> = parse("stock", stock_json)?;
    let cart: Vec<CartLine> = parse("cart", lines_json)?;
    let discount = parse_decimal("discount", discount)?;
    let tax_rate = parse_decimal("tax rate", tax_rate)?;

    let lines = cart
        .iter()
        .map(|line| {
            let unit = stock
                .iter()
                .find(|s| s.id == line.stock_unit_id)
                .ok_or_else(|| format!("Unknown stock unit {}", line.stock_unit_id))?;
            let product = products
                .iter()
                .find(|p| p.id == unit.product_id)
                .ok_or_else(|| format!("Unknown product {}", unit.product_id))?;
            Ok(PricedLine {
                unit,
                product,
                quantity: line.quantity,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    to_json(&shared::compute_totals(&lines, discount, tax_rate))
}
