//! HTTP handler for point-of-sale checkout

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::inventory::{CheckoutInput, CheckoutReceipt};
use crate::AppState;

/// Check out a cart
pub async fn checkout(
    State(state): State<AppState>,
    Json(input): Json<CheckoutInput>,
) -> AppResult<Json<CheckoutReceipt>> {
    let receipt = state.inventory.checkout(input).await?;
    Ok(Json(receipt))
}
