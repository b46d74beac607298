//! Ledger reducer
//!
//! [`apply_transaction`] is the only function that changes stock. It is pure:
//! the caller passes in the current stock, the transaction and the
//! confirmation instant, and gets back the new stock plus the confirmed
//! transaction. Lookups that miss never fail the call; they are reported as
//! [`LedgerAnomaly`] values so the caller can decide whether to log them.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Customer, StockUnit, Transaction, TransactionKind, TransactionStatus};
use crate::types::is_stock_location;

/// Default shelf life given to batches first created by a restock or purchase
pub const DEFAULT_RESTOCK_SHELF_LIFE_DAYS: i64 = 730;

/// Tunables for the reducer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerPolicy {
    pub restock_shelf_life_days: i64,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            restock_shelf_life_days: DEFAULT_RESTOCK_SHELF_LIFE_DAYS,
        }
    }
}

impl LedgerPolicy {
    /// Expiry for a batch first created at `confirmed_at`; unknown when the
    /// shelf life is negative or lands outside the calendar
    fn restock_expiry(&self, confirmed_at: DateTime<Utc>) -> Option<NaiveDate> {
        let days = u64::try_from(self.restock_shelf_life_days).ok()?;
        confirmed_at.date_naive().checked_add_days(Days::new(days))
    }
}

/// Something the reducer could not apply as written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "anomaly", rename_all = "snake_case")]
pub enum LedgerAnomaly {
    /// The source is a supplier or customer, which holds no stock to move
    UntrackedSource {
        product_id: String,
        batch_number: String,
        location_id: String,
    },
    /// No stock record matched the source side of the transaction
    SourceMissing {
        product_id: String,
        batch_number: String,
        location_id: String,
    },
    /// The source record held fewer units than requested and was removed
    Shortfall {
        product_id: String,
        batch_number: String,
        location_id: String,
        available: u32,
        requested: u32,
    },
}

/// Result of one reducer call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerOutcome {
    pub stock: Vec<StockUnit>,
    pub transaction: Transaction,
    /// False when the transaction was not open and nothing changed
    pub applied: bool,
    pub anomalies: Vec<LedgerAnomaly>,
}

/// Apply one transaction to the stock collection and confirm it.
///
/// Transactions that are not PENDING or IN_TRANSIT are returned untouched
/// along with the unchanged stock, which makes repeated calls idempotent.
pub fn apply_transaction(
    stock: Vec<StockUnit>,
    transaction: Transaction,
    confirmed_at: DateTime<Utc>,
    policy: &LedgerPolicy,
) -> LedgerOutcome {
    if !transaction.status.is_open() {
        return LedgerOutcome {
            stock,
            transaction,
            applied: false,
            anomalies: Vec::new(),
        };
    }

    let mut ledger = Ledger {
        stock,
        anomalies: Vec::new(),
        product_id: &transaction.product_id,
        batch_number: &transaction.batch_number,
    };
    let quantity = transaction.quantity;

    match &transaction.kind {
        TransactionKind::Transfer { from_id, to_id } => {
            // Only what actually left the source arrives at the destination
            if let Some((moved, expiry)) = ledger.withdraw(from_id, quantity) {
                ledger.deposit(to_id, moved, expiry);
            }
        }
        TransactionKind::Sale { from_id, .. } => {
            ledger.withdraw(from_id, quantity);
        }
        TransactionKind::Return { to_id, .. } => {
            let expiry = ledger.known_batch_expiry();
            ledger.deposit(to_id, quantity, expiry);
        }
        TransactionKind::Restock { to_id } | TransactionKind::Purchase { to_id, .. } => {
            let expiry = ledger
                .known_batch_expiry()
                .or_else(|| policy.restock_expiry(confirmed_at));
            ledger.deposit(to_id, quantity, expiry);
        }
        TransactionKind::Adjustment { from_id, .. } => {
            ledger.set(from_id, quantity);
        }
        TransactionKind::Request { .. } => {}
    }

    let Ledger {
        mut stock,
        anomalies,
        ..
    } = ledger;
    stock.retain(|s| s.quantity > 0);

    let mut transaction = transaction;
    transaction.status = TransactionStatus::Confirmed;
    transaction.confirmed_at = Some(confirmed_at);

    LedgerOutcome {
        stock,
        transaction,
        applied: true,
        anomalies,
    }
}

/// Working state for a single application, scoped to one product batch
struct Ledger<'a> {
    stock: Vec<StockUnit>,
    anomalies: Vec<LedgerAnomaly>,
    product_id: &'a str,
    batch_number: &'a str,
}

impl Ledger<'_> {
    fn position(&self, location_id: &str) -> Option<usize> {
        self.stock
            .iter()
            .position(|s| s.matches(self.product_id, self.batch_number, location_id))
    }

    /// Expiry of this batch anywhere in the system, if any record knows it
    fn known_batch_expiry(&self) -> Option<NaiveDate> {
        self.stock
            .iter()
            .filter(|s| s.product_id == self.product_id && s.batch_number == self.batch_number)
            .find_map(|s| s.expiry_date)
    }

    /// Take up to `quantity` units out of the source record.
    ///
    /// Returns the units actually removed and the batch expiry, or `None`
    /// when no record matched or the source is not a stock location. A record
    /// that cannot cover the request is removed entirely rather than left
    /// negative.
    fn withdraw(&mut self, location_id: &str, quantity: u32) -> Option<(u32, Option<NaiveDate>)> {
        if !is_stock_location(location_id) {
            self.anomalies.push(LedgerAnomaly::UntrackedSource {
                product_id: self.product_id.to_string(),
                batch_number: self.batch_number.to_string(),
                location_id: location_id.to_string(),
            });
            return None;
        }

        let Some(idx) = self.position(location_id) else {
            self.anomalies.push(LedgerAnomaly::SourceMissing {
                product_id: self.product_id.to_string(),
                batch_number: self.batch_number.to_string(),
                location_id: location_id.to_string(),
            });
            return None;
        };

        let unit = &mut self.stock[idx];
        let expiry = unit.expiry_date;
        match unit.quantity.checked_sub(quantity) {
            Some(remaining) => {
                unit.quantity = remaining;
                Some((quantity, expiry))
            }
            None => {
                let available = unit.quantity;
                self.stock.remove(idx);
                self.anomalies.push(LedgerAnomaly::Shortfall {
                    product_id: self.product_id.to_string(),
                    batch_number: self.batch_number.to_string(),
                    location_id: location_id.to_string(),
                    available,
                    requested: quantity,
                });
                Some((available, expiry))
            }
        }
    }

    /// Add units to the destination record, creating it when absent
    fn deposit(&mut self, location_id: &str, quantity: u32, expiry: Option<NaiveDate>) {
        if !is_stock_location(location_id) || quantity == 0 {
            return;
        }

        match self.position(location_id) {
            Some(idx) => {
                let unit = &mut self.stock[idx];
                unit.quantity = unit.quantity.saturating_add(quantity);
                if unit.expiry_date.is_none() {
                    unit.expiry_date = expiry;
                }
            }
            None => self.stock.push(StockUnit::new(
                self.product_id,
                self.batch_number,
                location_id,
                quantity,
                expiry,
            )),
        }
    }

    /// Overwrite the record's quantity with an absolute count
    fn set(&mut self, location_id: &str, quantity: u32) {
        match self.position(location_id) {
            Some(idx) => self.stock[idx].quantity = quantity,
            None => {
                let expiry = self.known_batch_expiry();
                self.deposit(location_id, quantity, expiry);
            }
        }
    }
}

/// Loyalty points earned on a sale: floor(unit price × quantity / 10)
pub fn loyalty_points(unit_price: Decimal, quantity: u32) -> u32 {
    if unit_price <= Decimal::ZERO {
        return 0;
    }
    let points = (unit_price.saturating_mul(Decimal::from(quantity)) / Decimal::TEN).floor();
    points.to_u32().unwrap_or(u32::MAX)
}

/// Credit loyalty points for a confirmed sale to its customer.
///
/// Returns the points awarded, or `None` when the transaction is not a
/// confirmed sale with a known customer.
pub fn accrue_loyalty(customers: &mut [Customer], transaction: &Transaction) -> Option<u32> {
    if transaction.status != TransactionStatus::Confirmed {
        return None;
    }
    let TransactionKind::Sale {
        unit_price,
        customer_id: Some(customer_id),
        ..
    } = &transaction.kind
    else {
        return None;
    };

    let customer = customers.iter_mut().find(|c| &c.id == customer_id)?;
    if customer.history.contains(&transaction.id) {
        return None;
    }

    let points = loyalty_points(*unit_price, transaction.quantity);
    customer.loyalty_points = customer.loyalty_points.saturating_add(points);
    customer.history.push(transaction.id.clone());
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn expiry() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 12, 31)
    }

    fn tx(quantity: u32, kind: TransactionKind) -> Transaction {
        Transaction::pending("t1", "p1", "BAT-1", quantity, kind, now())
    }

    fn transfer(quantity: u32, from: &str, to: &str) -> Transaction {
        tx(
            quantity,
            TransactionKind::Transfer {
                from_id: from.to_string(),
                to_id: to.to_string(),
            },
        )
    }

    fn sale(quantity: u32, from: &str, customer: Option<&str>) -> Transaction {
        tx(
            quantity,
            TransactionKind::Sale {
                from_id: from.to_string(),
                unit_price: Decimal::new(1000, 2),
                tax_amount: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                payment_method: PaymentMethod::Cash,
                customer_id: customer.map(str::to_string),
            },
        )
    }

    fn qty_at(stock: &[StockUnit], location: &str) -> Option<u32> {
        stock
            .iter()
            .find(|s| s.matches("p1", "BAT-1", location))
            .map(|s| s.quantity)
    }

    fn apply(stock: Vec<StockUnit>, tx: Transaction) -> LedgerOutcome {
        apply_transaction(stock, tx, now(), &LedgerPolicy::default())
    }

    #[test]
    fn test_transfer_moves_units_between_locations() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 100, expiry())];

        let outcome = apply(stock, transfer(40, "warehouse", "ph1"));

        assert!(outcome.applied);
        assert!(outcome.anomalies.is_empty());
        assert_eq!(qty_at(&outcome.stock, "warehouse"), Some(60));
        assert_eq!(qty_at(&outcome.stock, "ph1"), Some(40));
        let created = outcome.stock.iter().find(|s| s.location_id == "ph1").unwrap();
        assert_eq!(created.expiry_date, expiry());
        assert_eq!(created.id, "p1:BAT-1@ph1");
        assert_eq!(outcome.transaction.status, TransactionStatus::Confirmed);
        assert_eq!(outcome.transaction.confirmed_at, Some(now()));
    }

    #[test]
    fn test_transfer_into_existing_record_increments() {
        let stock = vec![
            StockUnit::new("p1", "BAT-1", "warehouse", 100, expiry()),
            StockUnit::new("p1", "BAT-1", "ph1", 5, expiry()),
        ];

        let outcome = apply(stock, transfer(40, "warehouse", "ph1"));

        assert_eq!(outcome.stock.len(), 2);
        assert_eq!(qty_at(&outcome.stock, "ph1"), Some(45));
    }

    #[test]
    fn test_transfer_with_missing_source_is_flagged_and_credits_nothing() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "ph2", 10, expiry())];

        let outcome = apply(stock.clone(), transfer(40, "warehouse", "ph1"));

        assert!(outcome.applied);
        assert_eq!(outcome.stock, stock);
        assert_eq!(
            outcome.anomalies,
            vec![LedgerAnomaly::SourceMissing {
                product_id: "p1".to_string(),
                batch_number: "BAT-1".to_string(),
                location_id: "warehouse".to_string(),
            }]
        );
    }

    #[test]
    fn test_transfer_from_supplier_credits_nothing_and_is_flagged() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 10, expiry())];

        let outcome = apply(stock.clone(), transfer(40, "supplier", "warehouse"));

        assert!(outcome.applied);
        assert_eq!(outcome.stock, stock);
        assert_eq!(
            outcome.anomalies,
            vec![LedgerAnomaly::UntrackedSource {
                product_id: "p1".to_string(),
                batch_number: "BAT-1".to_string(),
                location_id: "supplier".to_string(),
            }]
        );
    }

    #[test]
    fn test_transfer_from_customer_into_empty_branch_creates_nothing() {
        let outcome = apply(Vec::new(), transfer(5, "customer", "ph1"));

        assert!(outcome.stock.is_empty());
        assert!(matches!(
            outcome.anomalies.as_slice(),
            [LedgerAnomaly::UntrackedSource { location_id, .. }] if location_id == "customer"
        ));
    }

    #[test]
    fn test_transfer_shortfall_removes_source_and_moves_only_available() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 30, expiry())];

        let outcome = apply(stock, transfer(40, "warehouse", "ph1"));

        assert_eq!(qty_at(&outcome.stock, "warehouse"), None);
        assert_eq!(qty_at(&outcome.stock, "ph1"), Some(30));
        assert!(matches!(
            outcome.anomalies.as_slice(),
            [LedgerAnomaly::Shortfall { available: 30, requested: 40, .. }]
        ));
    }

    #[test]
    fn test_sale_to_zero_prunes_record_and_creates_nothing() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "ph1", 10, expiry())];

        let outcome = apply(stock, sale(10, "ph1", None));

        assert!(outcome.stock.is_empty());
        assert!(outcome.anomalies.is_empty());
    }

    #[test]
    fn test_sale_decrements_source() {
        let stock = vec![
            StockUnit::new("p1", "BAT-1", "ph1", 10, expiry()),
            StockUnit::new("p1", "BAT-1", "warehouse", 100, expiry()),
        ];

        let outcome = apply(stock, sale(3, "ph1", None));

        assert_eq!(qty_at(&outcome.stock, "ph1"), Some(7));
        assert_eq!(qty_at(&outcome.stock, "warehouse"), Some(100));
        assert_eq!(qty_at(&outcome.stock, "customer"), None);
    }

    #[test]
    fn test_oversell_clamps_by_removing_record() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "ph1", 2, expiry())];

        let outcome = apply(stock, sale(5, "ph1", None));

        assert!(outcome.stock.is_empty());
        assert_eq!(outcome.anomalies.len(), 1);
    }

    #[test]
    fn test_return_restores_branch_stock() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 10, expiry())];

        let outcome = apply(
            stock,
            tx(
                2,
                TransactionKind::Return {
                    to_id: "ph1".to_string(),
                    customer_id: None,
                },
            ),
        );

        assert_eq!(qty_at(&outcome.stock, "ph1"), Some(2));
        let returned = outcome.stock.iter().find(|s| s.location_id == "ph1").unwrap();
        assert_eq!(returned.expiry_date, expiry());
    }

    #[test]
    fn test_restock_of_new_batch_gets_long_dated_expiry() {
        let outcome = apply(
            Vec::new(),
            tx(
                500,
                TransactionKind::Restock {
                    to_id: "warehouse".to_string(),
                },
            ),
        );

        let unit = &outcome.stock[0];
        assert_eq!(unit.quantity, 500);
        assert_eq!(
            unit.expiry_date,
            now().date_naive().checked_add_days(Days::new(730))
        );
    }

    #[test]
    fn test_restock_with_out_of_range_shelf_life_leaves_expiry_unknown() {
        let restock = || {
            tx(
                500,
                TransactionKind::Restock {
                    to_id: "warehouse".to_string(),
                },
            )
        };

        for days in [i64::from(i32::MAX), i64::MAX, -1] {
            let policy = LedgerPolicy {
                restock_shelf_life_days: days,
            };
            let outcome = apply_transaction(Vec::new(), restock(), now(), &policy);

            assert_eq!(outcome.stock[0].quantity, 500);
            assert_eq!(outcome.stock[0].expiry_date, None);
        }
    }

    #[test]
    fn test_purchase_increments_existing_batch() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 10, expiry())];

        let outcome = apply(
            stock,
            tx(
                90,
                TransactionKind::Purchase {
                    to_id: "warehouse".to_string(),
                    supplier_id: Some("sup-1".to_string()),
                    unit_cost: None,
                },
            ),
        );

        assert_eq!(qty_at(&outcome.stock, "warehouse"), Some(100));
        assert_eq!(outcome.stock[0].expiry_date, expiry());
    }

    #[test]
    fn test_adjustment_sets_absolute_quantity() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "ph1", 40, expiry())];

        let outcome = apply(
            stock,
            tx(
                37,
                TransactionKind::Adjustment {
                    from_id: "ph1".to_string(),
                    reason: Some("cycle count".to_string()),
                },
            ),
        );

        assert_eq!(qty_at(&outcome.stock, "ph1"), Some(37));
    }

    #[test]
    fn test_adjustment_to_zero_prunes_record() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "ph1", 40, expiry())];

        let outcome = apply(
            stock,
            tx(
                0,
                TransactionKind::Adjustment {
                    from_id: "ph1".to_string(),
                    reason: None,
                },
            ),
        );

        assert!(outcome.stock.is_empty());
    }

    #[test]
    fn test_request_moves_no_stock() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 40, expiry())];

        let outcome = apply(
            stock.clone(),
            tx(
                10,
                TransactionKind::Request {
                    from_id: "ph1".to_string(),
                    to_id: "warehouse".to_string(),
                },
            ),
        );

        assert!(outcome.applied);
        assert_eq!(outcome.stock, stock);
        assert_eq!(outcome.transaction.status, TransactionStatus::Confirmed);
    }

    #[test]
    fn test_confirmed_transaction_is_a_noop() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 100, expiry())];
        let first = apply(stock, transfer(40, "warehouse", "ph1"));

        let second = apply(first.stock.clone(), first.transaction.clone());

        assert!(!second.applied);
        assert_eq!(second.stock, first.stock);
        assert_eq!(second.transaction, first.transaction);
    }

    #[test]
    fn test_cancelled_transaction_is_a_noop() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 100, expiry())];
        let mut cancelled = transfer(40, "warehouse", "ph1");
        cancelled.status = TransactionStatus::Cancelled;

        let outcome = apply(stock.clone(), cancelled);

        assert!(!outcome.applied);
        assert_eq!(outcome.stock, stock);
        assert_eq!(outcome.transaction.confirmed_at, None);
    }

    #[test]
    fn test_in_transit_transfer_applies_on_confirmation() {
        let stock = vec![StockUnit::new("p1", "BAT-1", "warehouse", 100, expiry())];
        let mut held = transfer(40, "warehouse", "ph1");
        held.status = TransactionStatus::InTransit;

        let outcome = apply(stock, held);

        assert!(outcome.applied);
        assert_eq!(qty_at(&outcome.stock, "ph1"), Some(40));
    }

    #[test]
    fn test_loyalty_points_floor() {
        assert_eq!(loyalty_points(Decimal::new(1000, 2), 23), 23);
        assert_eq!(loyalty_points(Decimal::new(1250, 2), 3), 3);
        assert_eq!(loyalty_points(Decimal::new(500, 2), 1), 0);
    }

    #[test]
    fn test_loyalty_points_saturate_instead_of_overflowing() {
        assert_eq!(loyalty_points(Decimal::from(1_000_000), 100_000), u32::MAX);
        assert_eq!(loyalty_points(Decimal::MAX, u32::MAX), u32::MAX);
        assert_eq!(loyalty_points(Decimal::from(-5), 10), 0);
    }

    #[test]
    fn test_accrue_loyalty_on_confirmed_sale() {
        let mut customers = vec![Customer::new("c1", "John Doe", "555-0101", "john@example.com")];
        customers[0].loyalty_points = 150;
        let stock = vec![StockUnit::new("p1", "BAT-1", "ph1", 50, expiry())];
        let outcome = apply(stock, sale(23, "ph1", Some("c1")));

        let awarded = accrue_loyalty(&mut customers, &outcome.transaction);

        assert_eq!(awarded, Some(23));
        assert_eq!(customers[0].loyalty_points, 173);
        assert_eq!(customers[0].history, vec!["t1".to_string()]);

        // Crediting the same sale twice is ignored
        assert_eq!(accrue_loyalty(&mut customers, &outcome.transaction), None);
        assert_eq!(customers[0].loyalty_points, 173);
    }

    #[test]
    fn test_no_loyalty_for_pending_or_anonymous_sales() {
        let mut customers = vec![Customer::new("c1", "John Doe", "555-0101", "john@example.com")];

        assert_eq!(accrue_loyalty(&mut customers, &sale(23, "ph1", Some("c1"))), None);

        let mut anonymous = sale(23, "ph1", None);
        anonymous.status = TransactionStatus::Confirmed;
        assert_eq!(accrue_loyalty(&mut customers, &anonymous), None);

        let mut unknown = sale(23, "ph1", Some("c9"));
        unknown.status = TransactionStatus::Confirmed;
        assert_eq!(accrue_loyalty(&mut customers, &unknown), None);
        assert_eq!(customers[0].loyalty_points, 0);
    }
}
