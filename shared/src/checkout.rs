//! Point-of-sale cart arithmetic and transaction building

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Product, StockUnit, Transaction, TransactionKind};
use crate::types::PaymentMethod;

/// Default sales tax rate (7%)
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(7, 0, 0, false, 2);

/// Whether the register is selling or taking goods back
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutMode {
    #[default]
    Sale,
    Return,
}

/// Cart totals shown at checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// A priced cart line: the stock record being sold, its product and the count
#[derive(Debug, Clone)]
pub struct PricedLine<'a> {
    pub unit: &'a StockUnit,
    pub product: &'a Product,
    pub quantity: u32,
}

impl PricedLine<'_> {
    pub fn line_total(&self) -> Decimal {
        self.product.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Combine lines drawing on the same stock record, keeping first-seen order
pub fn merge_cart_lines(lines: Vec<PricedLine<'_>>) -> Vec<PricedLine<'_>> {
    let mut merged: Vec<PricedLine<'_>> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.unit.id == line.unit.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    merged
}

/// Compute totals: tax applies to the subtotal after discount, floored at zero
pub fn compute_totals(
    lines: &[PricedLine<'_>],
    discount: Decimal,
    tax_rate: Decimal,
) -> CartTotals {
    let subtotal = lines
        .iter()
        .map(PricedLine::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let taxable = subtotal.saturating_sub(discount).max(Decimal::ZERO);
    let tax = taxable.saturating_mul(tax_rate);

    CartTotals {
        subtotal,
        discount,
        tax,
        total: taxable.saturating_add(tax),
    }
}

/// Everything needed to turn a cart into ledger transactions
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub order_id: &'a str,
    pub mode: CheckoutMode,
    pub pharmacy_id: &'a str,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<&'a str>,
    pub tax_rate: Decimal,
    pub now: DateTime<Utc>,
}

/// Build one pending transaction per stock record in the cart, id
/// `{order}-{stock unit}`. Lines naming the same record are merged first.
pub fn build_checkout_transactions(
    request: &CheckoutRequest<'_>,
    lines: &[PricedLine<'_>],
) -> Vec<Transaction> {
    merge_cart_lines(lines.to_vec())
        .iter()
        .map(|line| {
            let kind = match request.mode {
                CheckoutMode::Sale => TransactionKind::Sale {
                    from_id: request.pharmacy_id.to_string(),
                    unit_price: line.product.unit_price,
                    tax_amount: line.line_total().saturating_mul(request.tax_rate),
                    discount_amount: Decimal::ZERO,
                    payment_method: request.payment_method,
                    customer_id: request.customer_id.map(str::to_string),
                },
                CheckoutMode::Return => TransactionKind::Return {
                    to_id: request.pharmacy_id.to_string(),
                    customer_id: request.customer_id.map(str::to_string),
                },
            };

            Transaction::pending(
                format!("{}-{}", request.order_id, line.unit.id),
                line.unit.product_id.clone(),
                line.unit.batch_number.clone(),
                line.quantity,
                kind,
                request.now,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            category: "Antibiotics".to_string(),
            brand: "Generic".to_string(),
            unit_price: dec(price),
            unit_cost: dec("1.00"),
            low_stock_threshold: 10,
            compliance_status: Default::default(),
        }
    }

    #[test]
    fn test_default_tax_rate() {
        assert_eq!(DEFAULT_TAX_RATE, dec("0.07"));
    }

    #[test]
    fn test_totals_apply_tax_after_discount() {
        let p1 = product("p1", "12.50");
        let p2 = product("p2", "5.00");
        let u1 = StockUnit::new("p1", "BAT-001", "ph1", 100, None);
        let u2 = StockUnit::new("p2", "BAT-002", "ph1", 100, None);
        let lines = vec![
            PricedLine { unit: &u1, product: &p1, quantity: 2 },
            PricedLine { unit: &u2, product: &p2, quantity: 3 },
        ];

        let totals = compute_totals(&lines, dec("10.00"), DEFAULT_TAX_RATE);

        assert_eq!(totals.subtotal, dec("40.00"));
        assert_eq!(totals.tax, dec("2.1000"));
        assert_eq!(totals.total, dec("32.1000"));
    }

    #[test]
    fn test_discount_larger_than_subtotal_floors_at_zero() {
        let p1 = product("p1", "5.00");
        let u1 = StockUnit::new("p1", "BAT-001", "ph1", 100, None);
        let lines = vec![PricedLine { unit: &u1, product: &p1, quantity: 1 }];

        let totals = compute_totals(&lines, dec("20.00"), DEFAULT_TAX_RATE);

        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_build_sale_transactions() {
        let p1 = product("p1", "12.50");
        let u1 = StockUnit::new("p1", "BAT-001", "ph1", 100, None);
        let lines = vec![PricedLine { unit: &u1, product: &p1, quantity: 4 }];
        let request = CheckoutRequest {
            order_id: "INV-000123",
            mode: CheckoutMode::Sale,
            pharmacy_id: "ph1",
            payment_method: PaymentMethod::Card,
            customer_id: Some("c1"),
            tax_rate: DEFAULT_TAX_RATE,
            now: Utc::now(),
        };

        let txs = build_checkout_transactions(&request, &lines);

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, "INV-000123-p1:BAT-001@ph1");
        assert_eq!(txs[0].batch_number, "BAT-001");
        match &txs[0].kind {
            TransactionKind::Sale { from_id, tax_amount, customer_id, .. } => {
                assert_eq!(from_id, "ph1");
                assert_eq!(*tax_amount, dec("3.5000"));
                assert_eq!(customer_id.as_deref(), Some("c1"));
            }
            other => panic!("expected sale, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cart_lines_sums_same_unit() {
        let p1 = product("p1", "10.00");
        let p2 = product("p2", "5.00");
        let u1 = StockUnit::new("p1", "BAT-001", "ph1", 5, None);
        let u2 = StockUnit::new("p2", "BAT-002", "ph1", 5, None);
        let lines = vec![
            PricedLine { unit: &u1, product: &p1, quantity: 2 },
            PricedLine { unit: &u2, product: &p2, quantity: 1 },
            PricedLine { unit: &u1, product: &p1, quantity: 3 },
        ];

        let merged = merge_cart_lines(lines);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].unit.id, "p1:BAT-001@ph1");
        assert_eq!(merged[0].quantity, 5);
        assert_eq!(merged[1].quantity, 1);
    }

    #[test]
    fn test_repeated_cart_line_builds_one_transaction() {
        let p1 = product("p1", "10.00");
        let u1 = StockUnit::new("p1", "BAT-001", "ph1", 5, None);
        let lines = vec![
            PricedLine { unit: &u1, product: &p1, quantity: 5 },
            PricedLine { unit: &u1, product: &p1, quantity: 5 },
        ];
        let request = CheckoutRequest {
            order_id: "INV-763787",
            mode: CheckoutMode::Sale,
            pharmacy_id: "ph1",
            payment_method: PaymentMethod::Cash,
            customer_id: Some("c1"),
            tax_rate: Decimal::ZERO,
            now: Utc::now(),
        };

        let txs = build_checkout_transactions(&request, &lines);

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].quantity, 10);
        let totals = compute_totals(&lines, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(txs[0].sale_value(), totals.subtotal);
    }

    #[test]
    fn test_totals_saturate_on_extreme_prices() {
        let mut p1 = product("p1", "1");
        p1.unit_price = Decimal::MAX;
        let u1 = StockUnit::new("p1", "BAT-001", "ph1", u32::MAX, None);
        let lines = vec![PricedLine { unit: &u1, product: &p1, quantity: u32::MAX }];

        let totals = compute_totals(&lines, Decimal::ZERO, DEFAULT_TAX_RATE);

        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn test_build_return_transactions() {
        let p1 = product("p1", "12.50");
        let u1 = StockUnit::new("p1", "BAT-001", "ph1", 100, None);
        let lines = vec![PricedLine { unit: &u1, product: &p1, quantity: 1 }];
        let request = CheckoutRequest {
            order_id: "INV-000124",
            mode: CheckoutMode::Return,
            pharmacy_id: "ph1",
            payment_method: PaymentMethod::Cash,
            customer_id: None,
            tax_rate: DEFAULT_TAX_RATE,
            now: Utc::now(),
        };

        let txs = build_checkout_transactions(&request, &lines);

        assert_eq!(txs[0].type_name(), "RETURN");
        assert_eq!(txs[0].kind.to_id(), "ph1");
    }
}
