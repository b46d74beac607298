//! Branch replenishment requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Transaction, TransactionKind};
use crate::types::WAREHOUSE_LOCATION;

/// A branch's open ask for replenishment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockRequest {
    pub id: String,
    pub pharmacy_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Transfer created when the request was fulfilled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Open,
    Fulfilled,
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Open => write!(f, "OPEN"),
            RequestStatus::Fulfilled => write!(f, "FULFILLED"),
            RequestStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("stock request {id} is already {status}")]
    AlreadyClosed { id: String, status: RequestStatus },
}

impl StockRequest {
    pub fn open(
        id: impl Into<String>,
        pharmacy_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            pharmacy_id: pharmacy_id.into(),
            product_id: product_id.into(),
            quantity,
            status: RequestStatus::Open,
            created_at,
            closed_at: None,
            transfer_id: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == RequestStatus::Open
    }

    /// Close the request as fulfilled and return the warehouse → branch
    /// transfer that satisfies it, still pending.
    pub fn fulfill(
        &mut self,
        transfer_id: impl Into<String>,
        batch_number: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Transaction, RequestError> {
        self.ensure_open()?;

        let transfer = Transaction::pending(
            transfer_id,
            self.product_id.clone(),
            batch_number,
            self.quantity,
            TransactionKind::Transfer {
                from_id: WAREHOUSE_LOCATION.to_string(),
                to_id: self.pharmacy_id.clone(),
            },
            now,
        );

        self.status = RequestStatus::Fulfilled;
        self.closed_at = Some(now);
        self.transfer_id = Some(transfer.id.clone());
        Ok(transfer)
    }

    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), RequestError> {
        self.ensure_open()?;
        self.status = RequestStatus::Rejected;
        self.closed_at = Some(now);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), RequestError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(RequestError::AlreadyClosed {
                id: self.id.clone(),
                status: self.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionStatus;

    fn request() -> StockRequest {
        StockRequest::open("r1", "ph1", "p1", 50, Utc::now())
    }

    #[test]
    fn test_fulfill_creates_transfer_to_branch() {
        let mut req = request();
        let tx = req.fulfill("t1", "BAT-1", Utc::now()).unwrap();

        assert_eq!(req.status, RequestStatus::Fulfilled);
        assert_eq!(req.transfer_id.as_deref(), Some("t1"));
        assert_eq!(tx.quantity, 50);
        assert_eq!(tx.kind.from_id(), WAREHOUSE_LOCATION);
        assert_eq!(tx.kind.to_id(), "ph1");
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_closed_request_cannot_change() {
        let mut req = request();
        req.reject(Utc::now()).unwrap();

        let err = req.fulfill("t1", "BAT-1", Utc::now()).unwrap_err();
        assert_eq!(
            err,
            RequestError::AlreadyClosed {
                id: "r1".to_string(),
                status: RequestStatus::Rejected
            }
        );
        assert!(req.reject(Utc::now()).is_err());
    }
}
