//! Ledger transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{PaymentMethod, CUSTOMER_LOCATION, SUPPLIER_LOCATION};

/// A requested movement or change of stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub product_id: String,
    pub batch_number: String,
    /// Units moved; for adjustments, the counted absolute quantity
    pub quantity: u32,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Kind-specific payload, tagged by transaction type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Goods leave a branch to a customer
    Sale {
        from_id: String,
        unit_price: Decimal,
        #[serde(default)]
        tax_amount: Decimal,
        #[serde(default)]
        discount_amount: Decimal,
        #[serde(default)]
        payment_method: PaymentMethod,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_id: Option<String>,
    },
    /// Goods come back from a customer
    Return {
        to_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_id: Option<String>,
    },
    Restock {
        to_id: String,
    },
    Purchase {
        to_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        supplier_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit_cost: Option<Decimal>,
    },
    Transfer {
        from_id: String,
        to_id: String,
    },
    /// Absolute correction, e.g. from a physical count
    Adjustment {
        from_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Replenishment ask recorded on the ledger; moves no stock
    Request {
        from_id: String,
        to_id: String,
    },
}

impl TransactionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            TransactionKind::Sale { .. } => "SALE",
            TransactionKind::Return { .. } => "RETURN",
            TransactionKind::Restock { .. } => "RESTOCK",
            TransactionKind::Purchase { .. } => "PURCHASE",
            TransactionKind::Transfer { .. } => "TRANSFER",
            TransactionKind::Adjustment { .. } => "ADJUSTMENT",
            TransactionKind::Request { .. } => "REQUEST",
        }
    }

    /// Location the goods leave from
    pub fn from_id(&self) -> &str {
        match self {
            TransactionKind::Sale { from_id, .. }
            | TransactionKind::Transfer { from_id, .. }
            | TransactionKind::Adjustment { from_id, .. }
            | TransactionKind::Request { from_id, .. } => from_id,
            TransactionKind::Return { .. } => CUSTOMER_LOCATION,
            TransactionKind::Restock { .. } | TransactionKind::Purchase { .. } => SUPPLIER_LOCATION,
        }
    }

    /// Location the goods arrive at
    pub fn to_id(&self) -> &str {
        match self {
            TransactionKind::Return { to_id, .. }
            | TransactionKind::Restock { to_id }
            | TransactionKind::Purchase { to_id, .. }
            | TransactionKind::Transfer { to_id, .. }
            | TransactionKind::Request { to_id, .. } => to_id,
            TransactionKind::Sale { .. } => CUSTOMER_LOCATION,
            TransactionKind::Adjustment { from_id, .. } => from_id,
        }
    }

    pub fn customer_id(&self) -> Option<&str> {
        match self {
            TransactionKind::Sale { customer_id, .. }
            | TransactionKind::Return { customer_id, .. } => customer_id.as_deref(),
            _ => None,
        }
    }
}

impl Transaction {
    /// Build a new pending transaction
    pub fn pending(
        id: impl Into<String>,
        product_id: impl Into<String>,
        batch_number: impl Into<String>,
        quantity: u32,
        kind: TransactionKind,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            batch_number: batch_number.into(),
            quantity,
            kind,
            status: TransactionStatus::Pending,
            created_at,
            confirmed_at: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn is_sale(&self) -> bool {
        matches!(self.kind, TransactionKind::Sale { .. })
    }

    /// Gross sale value (unit price × quantity, saturating), zero for non-sales
    pub fn sale_value(&self) -> Decimal {
        match &self.kind {
            TransactionKind::Sale { unit_price, .. } => {
                unit_price.saturating_mul(Decimal::from(self.quantity))
            }
            _ => Decimal::ZERO,
        }
    }
}

/// Lifecycle of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    InTransit,
    Confirmed,
    Cancelled,
}

impl TransactionStatus {
    /// Only pending and in-transit transactions may still be applied
    pub fn is_open(&self) -> bool {
        matches!(self, TransactionStatus::Pending | TransactionStatus::InTransit)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "PENDING"),
            TransactionStatus::InTransit => write!(f, "IN_TRANSIT"),
            TransactionStatus::Confirmed => write!(f, "CONFIRMED"),
            TransactionStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}
