//! HTTP handlers for alerts, the dashboard summary and the audit log

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{Alert, AuditEntry, DashboardSummary, DateRange};

use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Evaluate expiry against this date instead of today
    pub today: Option<NaiveDate>,
}

/// Current alerts, most severe first
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Json<Vec<Alert>> {
    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());
    Json(state.inventory.alerts(today).await)
}

/// Network-wide summary
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(state.inventory.dashboard().await)
}

#[derive(Debug, Serialize)]
pub struct RevenueResponse {
    #[serde(flatten)]
    pub range: DateRange,
    pub revenue: Decimal,
}

/// Confirmed sales revenue for `?start=YYYY-MM-DD&end=YYYY-MM-DD`
pub async fn get_revenue(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> AppResult<Json<RevenueResponse>> {
    let revenue = state.inventory.revenue_between(&range).await?;
    Ok(Json(RevenueResponse { range, revenue }))
}

/// Audit log, newest first
pub async fn list_audit_log(State(state): State<AppState>) -> Json<Vec<AuditEntry>> {
    Json(state.inventory.audit_log().await)
}
