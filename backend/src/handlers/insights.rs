//! HTTP handlers for generated insights

use axum::{
    extract::{Path, State},
    Json,
};

use crate::services::insight::InsightReport;
use crate::AppState;

/// Insights for the whole inventory
pub async fn inventory_insights(State(state): State<AppState>) -> Json<InsightReport> {
    // Snapshot first so the provider call runs without the ledger lock
    let ctx = state.inventory.insight_context().await;
    Json(state.insights.inventory_insights(&ctx).await)
}

/// Warehouse replenishment forecast
pub async fn replenishment_forecast(State(state): State<AppState>) -> Json<InsightReport> {
    let ctx = state.inventory.insight_context().await;
    Json(state.insights.replenishment_forecast(&ctx).await)
}

/// Suggestions for one pharmacy
pub async fn pharmacy_suggestions(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<String>,
) -> Json<InsightReport> {
    let ctx = state.inventory.insight_context().await;
    Json(state.insights.pharmacy_suggestions(&pharmacy_id, &ctx).await)
}
