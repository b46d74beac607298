//! HTTP handlers for the product catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::Product;

use crate::error::AppResult;
use crate::services::inventory::ProductInput;
use crate::AppState;

/// Register a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state.inventory.register_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List all products
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.inventory.list_products().await)
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state.inventory.get_product(&product_id).await?;
    Ok(Json(product))
}

/// Replace a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let product = state.inventory.update_product(&product_id, input).await?;
    Ok(Json(product))
}
