//! Read-only projections over ledger state, one per dashboard panel

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Product, StockRequest, StockUnit, Transaction, TransactionStatus};
use crate::types::DateRange;

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub product_count: usize,
    pub stock_record_count: usize,
    pub total_units: u64,
    /// Σ quantity × unit cost
    pub total_valuation: Decimal,
    /// Σ confirmed sale quantity × unit price
    pub confirmed_revenue: Decimal,
    pub pending_transactions: usize,
    pub open_requests: usize,
}

/// Stock value at cost across all locations
pub fn total_valuation(products: &[Product], stock: &[StockUnit]) -> Decimal {
    stock
        .iter()
        .filter_map(|s| {
            products
                .iter()
                .find(|p| p.id == s.product_id)
                .map(|p| p.unit_cost.saturating_mul(Decimal::from(s.quantity)))
        })
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Revenue from confirmed sales
pub fn confirmed_revenue(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Confirmed)
        .map(Transaction::sale_value)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Revenue from confirmed sales confirmed within the range
pub fn confirmed_revenue_between(transactions: &[Transaction], range: &DateRange) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Confirmed)
        .filter(|t| {
            t.confirmed_at
                .map(|at| range.contains(at.date_naive()))
                .unwrap_or(false)
        })
        .map(Transaction::sale_value)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Records held at one location
pub fn stock_at<'a>(stock: &'a [StockUnit], location_id: &str) -> Vec<&'a StockUnit> {
    stock.iter().filter(|s| s.location_id == location_id).collect()
}

/// Units of a product across every location
pub fn global_quantity(stock: &[StockUnit], product_id: &str) -> u64 {
    stock
        .iter()
        .filter(|s| s.product_id == product_id)
        .map(|s| u64::from(s.quantity))
        .sum()
}

/// Transactions still on their way to a location
pub fn pending_inbound<'a>(
    transactions: &'a [Transaction],
    location_id: &str,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| t.status.is_open() && t.kind.to_id() == location_id)
        .collect()
}

pub fn open_requests(requests: &[StockRequest]) -> Vec<&StockRequest> {
    requests.iter().filter(|r| r.is_open()).collect()
}

pub fn dashboard_summary(
    products: &[Product],
    stock: &[StockUnit],
    transactions: &[Transaction],
    requests: &[StockRequest],
) -> DashboardSummary {
    DashboardSummary {
        product_count: products.len(),
        stock_record_count: stock.len(),
        total_units: stock.iter().map(|s| u64::from(s.quantity)).sum(),
        total_valuation: total_valuation(products, stock),
        confirmed_revenue: confirmed_revenue(transactions),
        pending_transactions: transactions.iter().filter(|t| t.status.is_open()).count(),
        open_requests: open_requests(requests).len(),
    }
}
