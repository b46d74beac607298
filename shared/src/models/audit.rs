//! Compliance audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AuditSeverity;

/// One entry in the audit trail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    /// Area of the system that produced the entry (e.g. "Catalog", "Ledger")
    pub module: String,
    pub details: String,
    pub severity: AuditSeverity,
}
