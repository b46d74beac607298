//! HTTP handlers for stock records and ledger transactions

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{StockUnit, Transaction};

use crate::error::AppResult;
use crate::services::inventory::{LedgerReceipt, SubmitTransactionInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub location: Option<String>,
}

/// List stock records, optionally for one location
pub async fn list_stock(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Json<Vec<StockUnit>> {
    Json(state.inventory.list_stock(query.location.as_deref()).await)
}

/// List transactions, newest first
pub async fn list_transactions(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.inventory.list_transactions().await)
}

/// Transactions in transit to a location
pub async fn list_inbound(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
) -> Json<Vec<Transaction>> {
    Json(state.inventory.pending_inbound(&location_id).await)
}

/// Record a transaction
pub async fn submit_transaction(
    State(state): State<AppState>,
    Json(input): Json<SubmitTransactionInput>,
) -> AppResult<Json<LedgerReceipt>> {
    let receipt = state.inventory.submit_transaction(input).await?;
    Ok(Json(receipt))
}

/// Confirm receipt of a held transfer
pub async fn confirm_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> AppResult<Json<LedgerReceipt>> {
    let receipt = state.inventory.confirm_receipt(&transaction_id).await?;
    Ok(Json(receipt))
}

/// Cancel a transaction that has not been applied
pub async fn cancel_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> AppResult<Json<Transaction>> {
    let transaction = state.inventory.cancel_transaction(&transaction_id).await?;
    Ok(Json(transaction))
}
