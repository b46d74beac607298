//! Inventory service: the single authoritative in-memory ledger state
//!
//! Every stock change goes through [`shared::apply_transaction`]. Each
//! operation holds the write lock for its whole read-modify-write, so the
//! service behaves as one logical writer.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    accrue_loyalty, apply_transaction, build_checkout_transactions, compute_totals,
    confirmed_revenue_between, dashboard_summary, derive_alerts, is_sold_at_loss,
    merge_cart_lines, validate_batch_number, validate_cart_line, validate_discount,
    validate_identifier, validate_movement_quantity, validate_phone, validate_pricing,
    validate_stock_location, validate_transfer_route, Alert, AuditEntry, AuditSeverity,
    CartTotals, CheckoutMode, CheckoutRequest, ComplianceStatus, Customer, DashboardSummary,
    DateRange, LedgerAnomaly, LedgerPolicy, PaymentMethod, PricedLine, Product, StockRequest,
    StockUnit, Transaction, TransactionKind, TransactionStatus,
};
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::error::{check, AppError, AppResult};

const SYSTEM_ACTOR: &str = "system";

/// Everything the running process knows
#[derive(Debug, Default)]
pub struct LedgerState {
    pub products: Vec<Product>,
    pub stock: Vec<StockUnit>,
    /// Newest first
    pub transactions: Vec<Transaction>,
    pub customers: Vec<Customer>,
    pub requests: Vec<StockRequest>,
    /// Newest first
    pub audit_log: Vec<AuditEntry>,
}

/// Inventory service for catalog, ledger, checkout and requests
#[derive(Clone)]
pub struct InventoryService {
    state: Arc<RwLock<LedgerState>>,
    policy: LedgerPolicy,
    tax_rate: Decimal,
    expiry_window_days: i64,
}

/// Input for registering or editing a product
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub brand: String,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    pub low_stock_threshold: u32,
    #[serde(default)]
    pub compliance_status: ComplianceStatus,
}

/// Input for registering a customer
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Input for recording a ledger transaction
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTransactionInput {
    pub product_id: String,
    pub batch_number: String,
    pub quantity: u32,
    #[serde(flatten)]
    pub kind: TransactionKind,
    /// Keep a transfer in transit until the branch confirms receipt
    #[serde(default)]
    pub hold_for_receipt: bool,
}

/// What a ledger write did
#[derive(Debug, Clone, Serialize)]
pub struct LedgerReceipt {
    pub transaction: Transaction,
    pub applied: bool,
    pub anomalies: Vec<LedgerAnomaly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty_points_awarded: Option<u32>,
}

/// One line of a point-of-sale cart
#[derive(Debug, Clone, Deserialize)]
pub struct CartLineInput {
    pub stock_unit_id: String,
    pub quantity: u32,
}

/// Input for a point-of-sale checkout
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutInput {
    pub pharmacy_id: String,
    #[serde(default)]
    pub mode: CheckoutMode,
    pub lines: Vec<CartLineInput>,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
}

/// Result of a checkout
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub totals: CartTotals,
    pub receipts: Vec<LedgerReceipt>,
}

/// Input for opening a stock request
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRequestInput {
    pub pharmacy_id: String,
    pub product_id: String,
    pub quantity: u32,
}

/// Input for fulfilling a stock request from the warehouse
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillRequestInput {
    pub batch_number: String,
    #[serde(default)]
    pub hold_for_receipt: bool,
}

/// Result of fulfilling a request
#[derive(Debug, Clone, Serialize)]
pub struct FulfillmentReceipt {
    pub request: StockRequest,
    pub ledger: LedgerReceipt,
}

/// Snapshot handed to the insight prompts
#[derive(Debug, Clone)]
pub struct InsightContext {
    pub products: Vec<Product>,
    pub stock: Vec<StockUnit>,
    pub transactions: Vec<Transaction>,
}

impl InventoryService {
    /// Create a new InventoryService with empty state
    pub fn new(policy: LedgerPolicy, tax_rate: Decimal, expiry_window_days: i64) -> Self {
        Self::with_state(LedgerState::default(), policy, tax_rate, expiry_window_days)
    }

    /// Create a service over existing state
    pub fn with_state(
        state: LedgerState,
        policy: LedgerPolicy,
        tax_rate: Decimal,
        expiry_window_days: i64,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            policy,
            tax_rate,
            expiry_window_days,
        }
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Register a product in the catalog
    pub async fn register_product(&self, input: ProductInput) -> AppResult<Product> {
        validate_product_input(&input)?;

        let mut state = self.state.write().await;
        if state.products.iter().any(|p| p.id == input.id) {
            return Err(AppError::DuplicateEntry(format!("Product {}", input.id)));
        }

        let product = product_from_input(input);
        if is_sold_at_loss(&product) {
            tracing::warn!(product_id = %product.id, "Product priced below cost");
        }
        state.products.push(product.clone());
        record_audit(
            &mut state,
            "Catalog",
            "ADD_PRODUCT",
            format!("Registered {}", product.name),
            AuditSeverity::Info,
        );
        tracing::info!(product_id = %product.id, "Product registered");

        Ok(product)
    }

    /// Replace a product by id
    pub async fn update_product(&self, id: &str, input: ProductInput) -> AppResult<Product> {
        validate_product_input(&input)?;
        if input.id != id {
            return Err(AppError::validation("id", "Product id cannot be changed"));
        }

        let mut state = self.state.write().await;
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        *slot = product_from_input(input);
        let product = slot.clone();
        record_audit(
            &mut state,
            "Catalog",
            "UPDATE_PRODUCT",
            format!("Updated {}", product.name),
            AuditSeverity::Info,
        );

        Ok(product)
    }

    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        let state = self.state.read().await;
        state
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn list_products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    // ------------------------------------------------------------------
    // Customers
    // ------------------------------------------------------------------

    pub async fn register_customer(&self, input: CustomerInput) -> AppResult<Customer> {
        input.validate()?;
        check("id", validate_identifier(&input.id))?;
        check("phone", validate_phone(&input.phone))?;

        let mut state = self.state.write().await;
        if state.customers.iter().any(|c| c.id == input.id) {
            return Err(AppError::DuplicateEntry(format!("Customer {}", input.id)));
        }

        let customer = Customer::new(input.id, input.name, input.phone, input.email);
        state.customers.push(customer.clone());
        Ok(customer)
    }

    pub async fn list_customers(&self) -> Vec<Customer> {
        self.state.read().await.customers.clone()
    }

    // ------------------------------------------------------------------
    // Ledger
    // ------------------------------------------------------------------

    /// Stock records, optionally limited to one location
    pub async fn list_stock(&self, location_id: Option<&str>) -> Vec<StockUnit> {
        let state = self.state.read().await;
        match location_id {
            Some(location) => shared::stock_at(&state.stock, location)
                .into_iter()
                .cloned()
                .collect(),
            None => state.stock.clone(),
        }
    }

    pub async fn list_transactions(&self) -> Vec<Transaction> {
        self.state.read().await.transactions.clone()
    }

    /// Transactions still on their way to a location
    pub async fn pending_inbound(&self, location_id: &str) -> Vec<Transaction> {
        let state = self.state.read().await;
        shared::pending_inbound(&state.transactions, location_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Record a transaction and confirm it through the ledger.
    ///
    /// Transfers submitted with `hold_for_receipt` are stored in transit and
    /// only applied when the receiving branch confirms them.
    pub async fn submit_transaction(
        &self,
        input: SubmitTransactionInput,
    ) -> AppResult<LedgerReceipt> {
        validate_transaction_input(&input)?;

        let mut state = self.state.write().await;
        if !state.products.iter().any(|p| p.id == input.product_id) {
            return Err(AppError::NotFound("Product".to_string()));
        }
        if let Some(customer_id) = input.kind.customer_id() {
            if !state.customers.iter().any(|c| c.id == customer_id) {
                return Err(AppError::NotFound("Customer".to_string()));
            }
        }

        let now = Utc::now();
        let hold = input.hold_for_receipt && matches!(input.kind, TransactionKind::Transfer { .. });
        let mut transaction = Transaction::pending(
            new_transaction_id(),
            input.product_id,
            input.batch_number,
            input.quantity,
            input.kind,
            now,
        );

        if hold {
            transaction.status = TransactionStatus::InTransit;
            tracing::info!(
                transaction_id = %transaction.id,
                "Transfer dispatched, awaiting receipt"
            );
            state.transactions.insert(0, transaction.clone());
            return Ok(LedgerReceipt {
                transaction,
                applied: false,
                anomalies: Vec::new(),
                loyalty_points_awarded: None,
            });
        }

        Ok(self.apply_locked(&mut state, transaction, now))
    }

    /// Confirm receipt of a held transaction. Already-confirmed transactions
    /// are returned unchanged.
    pub async fn confirm_receipt(&self, transaction_id: &str) -> AppResult<LedgerReceipt> {
        let mut state = self.state.write().await;
        let transaction = state
            .transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        Ok(self.apply_locked(&mut state, transaction, Utc::now()))
    }

    /// Cancel a transaction that has not been applied yet
    pub async fn cancel_transaction(&self, transaction_id: &str) -> AppResult<Transaction> {
        let mut state = self.state.write().await;
        let transaction = state
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        if !transaction.status.is_open() {
            return Err(AppError::InvalidStateTransition(format!(
                "transaction {} is already {}",
                transaction.id, transaction.status
            )));
        }

        transaction.status = TransactionStatus::Cancelled;
        let cancelled = transaction.clone();
        record_audit(
            &mut state,
            "Ledger",
            "CANCEL_TRANSACTION",
            format!("Cancelled {} {}", cancelled.type_name(), cancelled.id),
            AuditSeverity::Warning,
        );

        Ok(cancelled)
    }

    /// Run the reducer against locked state and record the outcome.
    ///
    /// The new stock is committed only after loyalty has been credited, so
    /// the stock and transaction collections always change together.
    fn apply_locked(
        &self,
        state: &mut LedgerState,
        transaction: Transaction,
        now: DateTime<Utc>,
    ) -> LedgerReceipt {
        let outcome = apply_transaction(state.stock.clone(), transaction, now, &self.policy);
        let transaction = outcome.transaction;

        if !outcome.applied {
            tracing::debug!(
                transaction_id = %transaction.id,
                status = %transaction.status,
                "Transaction not open, ledger unchanged"
            );
            return LedgerReceipt {
                transaction,
                applied: false,
                anomalies: Vec::new(),
                loyalty_points_awarded: None,
            };
        }

        for anomaly in &outcome.anomalies {
            tracing::warn!(transaction_id = %transaction.id, ?anomaly, "Ledger anomaly");
        }

        let loyalty_points_awarded = accrue_loyalty(&mut state.customers, &transaction);
        state.stock = outcome.stock;

        match state.transactions.iter_mut().find(|t| t.id == transaction.id) {
            Some(slot) => *slot = transaction.clone(),
            None => state.transactions.insert(0, transaction.clone()),
        }

        let severity = if outcome.anomalies.is_empty() {
            AuditSeverity::Info
        } else {
            AuditSeverity::Warning
        };
        record_audit(
            state,
            "Ledger",
            transaction.type_name(),
            format!(
                "{} x{} of {} batch {} ({} -> {})",
                transaction.id,
                transaction.quantity,
                transaction.product_id,
                transaction.batch_number,
                transaction.kind.from_id(),
                transaction.kind.to_id()
            ),
            severity,
        );
        tracing::info!(
            transaction_id = %transaction.id,
            kind = transaction.type_name(),
            quantity = transaction.quantity,
            "Transaction confirmed"
        );

        LedgerReceipt {
            transaction,
            applied: true,
            anomalies: outcome.anomalies,
            loyalty_points_awarded,
        }
    }

    // ------------------------------------------------------------------
    // Point of sale
    // ------------------------------------------------------------------

    /// Check out a cart at a branch: one sale (or return) per stock record.
    ///
    /// Lines naming the same record are merged before the stock check, so a
    /// cart is either applied in full or rejected untouched.
    pub async fn checkout(&self, input: CheckoutInput) -> AppResult<CheckoutReceipt> {
        check("pharmacy_id", validate_stock_location(&input.pharmacy_id))?;
        check("discount", validate_discount(input.discount))?;
        if input.lines.is_empty() {
            return Err(AppError::validation("lines", "Cart is empty"));
        }

        let mut state = self.state.write().await;
        if let Some(customer_id) = &input.customer_id {
            if !state.customers.iter().any(|c| &c.id == customer_id) {
                return Err(AppError::NotFound("Customer".to_string()));
            }
        }

        let now = Utc::now();
        let order_id = new_order_id(now);
        let (totals, transactions) = {
            let mut lines = Vec::with_capacity(input.lines.len());
            for line in &input.lines {
                let unit = state
                    .stock
                    .iter()
                    .find(|s| s.id == line.stock_unit_id && s.location_id == input.pharmacy_id)
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Stock unit {}", line.stock_unit_id))
                    })?;
                check("quantity", validate_movement_quantity(line.quantity))?;
                let product = state
                    .products
                    .iter()
                    .find(|p| p.id == unit.product_id)
                    .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
                lines.push(PricedLine {
                    unit,
                    product,
                    quantity: line.quantity,
                });
            }

            let lines = merge_cart_lines(lines);
            if input.mode == CheckoutMode::Sale {
                for line in &lines {
                    validate_cart_line(line.unit, line.quantity).map_err(|msg| {
                        AppError::InsufficientInventory(format!("{}: {}", line.unit.id, msg))
                    })?;
                }
            }

            let request = CheckoutRequest {
                order_id: &order_id,
                mode: input.mode,
                pharmacy_id: &input.pharmacy_id,
                payment_method: input.payment_method,
                customer_id: input.customer_id.as_deref(),
                tax_rate: self.tax_rate,
                now,
            };
            (
                compute_totals(&lines, input.discount, self.tax_rate),
                build_checkout_transactions(&request, &lines),
            )
        };

        let receipts = transactions
            .into_iter()
            .map(|tx| self.apply_locked(&mut state, tx, now))
            .collect();

        tracing::info!(order_id = %order_id, total = %totals.total, "Checkout completed");

        Ok(CheckoutReceipt {
            order_id,
            totals,
            receipts,
        })
    }

    // ------------------------------------------------------------------
    // Stock requests
    // ------------------------------------------------------------------

    pub async fn open_request(&self, input: OpenRequestInput) -> AppResult<StockRequest> {
        check("pharmacy_id", validate_stock_location(&input.pharmacy_id))?;
        check("quantity", validate_movement_quantity(input.quantity))?;

        let mut state = self.state.write().await;
        if !state.products.iter().any(|p| p.id == input.product_id) {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let request = StockRequest::open(
            format!("req-{}", Uuid::new_v4()),
            input.pharmacy_id,
            input.product_id,
            input.quantity,
            Utc::now(),
        );
        state.requests.insert(0, request.clone());
        Ok(request)
    }

    pub async fn list_requests(&self) -> Vec<StockRequest> {
        self.state.read().await.requests.clone()
    }

    /// Fulfill a request with a warehouse → branch transfer
    pub async fn fulfill_request(
        &self,
        request_id: &str,
        input: FulfillRequestInput,
    ) -> AppResult<FulfillmentReceipt> {
        check("batch_number", validate_batch_number(&input.batch_number))?;

        let mut state = self.state.write().await;
        let now = Utc::now();
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| AppError::NotFound("Stock request".to_string()))?;

        let mut transfer = request.fulfill(new_transaction_id(), input.batch_number, now)?;
        let request = request.clone();
        record_audit(
            &mut state,
            "Logistics",
            "FULFILL_REQUEST",
            format!("Request {} fulfilled by {}", request.id, transfer.id),
            AuditSeverity::Info,
        );

        let ledger = if input.hold_for_receipt {
            transfer.status = TransactionStatus::InTransit;
            state.transactions.insert(0, transfer.clone());
            LedgerReceipt {
                transaction: transfer,
                applied: false,
                anomalies: Vec::new(),
                loyalty_points_awarded: None,
            }
        } else {
            self.apply_locked(&mut state, transfer, now)
        };

        Ok(FulfillmentReceipt { request, ledger })
    }

    pub async fn reject_request(&self, request_id: &str) -> AppResult<StockRequest> {
        let mut state = self.state.write().await;
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| AppError::NotFound("Stock request".to_string()))?;

        request.reject(Utc::now())?;
        let request = request.clone();
        record_audit(
            &mut state,
            "Logistics",
            "REJECT_REQUEST",
            format!("Request {} rejected", request.id),
            AuditSeverity::Info,
        );
        Ok(request)
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    pub async fn alerts(&self, today: NaiveDate) -> Vec<Alert> {
        let state = self.state.read().await;
        derive_alerts(
            &state.products,
            &state.stock,
            &state.requests,
            today,
            self.expiry_window_days,
        )
    }

    pub async fn dashboard(&self) -> DashboardSummary {
        let state = self.state.read().await;
        dashboard_summary(&state.products, &state.stock, &state.transactions, &state.requests)
    }

    /// Confirmed sales revenue with a confirmation date inside the range
    pub async fn revenue_between(&self, range: &DateRange) -> AppResult<Decimal> {
        if range.end < range.start {
            return Err(AppError::validation("end", "End date is before start date"));
        }
        let state = self.state.read().await;
        Ok(confirmed_revenue_between(&state.transactions, range))
    }

    pub async fn audit_log(&self) -> Vec<AuditEntry> {
        self.state.read().await.audit_log.clone()
    }

    pub async fn insight_context(&self) -> InsightContext {
        let state = self.state.read().await;
        InsightContext {
            products: state.products.clone(),
            stock: state.stock.clone(),
            transactions: state.transactions.clone(),
        }
    }
}

fn validate_product_input(input: &ProductInput) -> AppResult<()> {
    input.validate()?;
    check("id", validate_identifier(&input.id))?;
    check("unit_price", validate_pricing(input.unit_price, input.unit_cost))
}

fn validate_transaction_input(input: &SubmitTransactionInput) -> AppResult<()> {
    check("batch_number", validate_batch_number(&input.batch_number))?;
    match &input.kind {
        // A count of zero is a legitimate audit result
        TransactionKind::Adjustment { from_id, .. } => {
            check("from_id", validate_stock_location(from_id))
        }
        TransactionKind::Transfer { from_id, to_id } => {
            check("quantity", validate_movement_quantity(input.quantity))?;
            check("to_id", validate_transfer_route(from_id, to_id))
        }
        TransactionKind::Sale { from_id, unit_price, .. } => {
            check("quantity", validate_movement_quantity(input.quantity))?;
            check("unit_price", validate_pricing(*unit_price, Decimal::ZERO))?;
            check("from_id", validate_stock_location(from_id))
        }
        TransactionKind::Purchase {
            to_id, unit_cost, ..
        } => {
            check("quantity", validate_movement_quantity(input.quantity))?;
            if let Some(cost) = unit_cost {
                check("unit_cost", validate_pricing(Decimal::ZERO, *cost))?;
            }
            check("to_id", validate_stock_location(to_id))
        }
        TransactionKind::Return { to_id, .. } | TransactionKind::Restock { to_id } => {
            check("quantity", validate_movement_quantity(input.quantity))?;
            check("to_id", validate_stock_location(to_id))
        }
        TransactionKind::Request { from_id, to_id } => {
            check("quantity", validate_movement_quantity(input.quantity))?;
            check("to_id", validate_transfer_route(from_id, to_id))
        }
    }
}

fn product_from_input(input: ProductInput) -> Product {
    Product {
        id: input.id,
        name: input.name,
        category: input.category,
        brand: input.brand,
        unit_price: input.unit_price,
        unit_cost: input.unit_cost,
        low_stock_threshold: input.low_stock_threshold,
        compliance_status: input.compliance_status,
    }
}

fn record_audit(
    state: &mut LedgerState,
    module: &str,
    action: &str,
    details: String,
    severity: AuditSeverity,
) {
    state.audit_log.insert(
        0,
        AuditEntry {
            id: format!("log-{}", Uuid::new_v4()),
            timestamp: Utc::now(),
            actor: SYSTEM_ACTOR.to_string(),
            action: action.to_string(),
            module: module.to_string(),
            details,
            severity,
        },
    );
}

fn new_transaction_id() -> String {
    format!("trx-{}", Uuid::new_v4())
}

/// Order ids look like `INV-483920`: the last six digits of the epoch millis
fn new_order_id(now: DateTime<Utc>) -> String {
    format!("INV-{:06}", now.timestamp_millis().rem_euclid(1_000_000))
}
