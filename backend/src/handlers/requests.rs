//! HTTP handlers for branch stock requests

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::StockRequest;

use crate::error::AppResult;
use crate::services::inventory::{FulfillRequestInput, FulfillmentReceipt, OpenRequestInput};
use crate::AppState;

/// Open a stock request
pub async fn open_request(
    State(state): State<AppState>,
    Json(input): Json<OpenRequestInput>,
) -> AppResult<(StatusCode, Json<StockRequest>)> {
    let request = state.inventory.open_request(input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List stock requests, newest first
pub async fn list_requests(State(state): State<AppState>) -> Json<Vec<StockRequest>> {
    Json(state.inventory.list_requests().await)
}

/// Fulfill a request from the warehouse
pub async fn fulfill_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(input): Json<FulfillRequestInput>,
) -> AppResult<Json<FulfillmentReceipt>> {
    let receipt = state.inventory.fulfill_request(&request_id, input).await?;
    Ok(Json(receipt))
}

/// Reject a request
pub async fn reject_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<Json<StockRequest>> {
    let request = state.inventory.reject_request(&request_id).await?;
    Ok(Json(request))
}
