//! HTTP handlers for point-of-sale customers

use axum::{extract::State, http::StatusCode, Json};
use shared::Customer;

use crate::error::AppResult;
use crate::services::inventory::CustomerInput;
use crate::AppState;

/// Register a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = state.inventory.register_customer(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// List customers with their loyalty balances
pub async fn list_customers(State(state): State<AppState>) -> Json<Vec<Customer>> {
    Json(state.inventory.list_customers().await)
}
