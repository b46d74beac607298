//! Route definitions for the Pharmacy Inventory API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .nest("/products", product_routes())
        .nest("/customers", customer_routes())
        // Ledger
        .nest("/stock", stock_routes())
        .nest("/transactions", transaction_routes())
        // Point of sale
        .route("/checkout", post(handlers::checkout))
        // Branch replenishment
        .nest("/requests", request_routes())
        // Read models
        .route("/alerts", get(handlers::list_alerts))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/dashboard/revenue", get(handlers::get_revenue))
        .route("/audit", get(handlers::list_audit_log))
        .nest("/insights", insight_routes())
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
}

/// Customer routes
fn customer_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_customers).post(handlers::create_customer))
}

/// Stock record routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock))
        .route("/:location_id/inbound", get(handlers::list_inbound))
}

/// Ledger transaction routes
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transactions).post(handlers::submit_transaction),
        )
        .route("/:transaction_id/confirm", post(handlers::confirm_transaction))
        .route("/:transaction_id/cancel", post(handlers::cancel_transaction))
}

/// Stock request routes
fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_requests).post(handlers::open_request))
        .route("/:request_id/fulfill", post(handlers::fulfill_request))
        .route("/:request_id/reject", post(handlers::reject_request))
}

/// Insight routes
fn insight_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(handlers::inventory_insights))
        .route("/forecast", get(handlers::replenishment_forecast))
        .route("/pharmacies/:pharmacy_id", get(handlers::pharmacy_suggestions))
}
