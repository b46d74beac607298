//! Pharmacy Inventory Ledger - Backend Server
//!
//! Keeps the stock ledger for a central warehouse and its branch pharmacies:
//! catalog, transfers, point-of-sale checkout, replenishment requests and
//! alerts, served as a JSON API.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use config::InsightProviderKind;
use error::{AppError, AppResult};
use external::GeminiClient;
use services::{InsightProvider, InsightService, InventoryService, StaticInsightProvider};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
    pub insights: InsightService,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    // Initialize tracing
    let json_logs = config.logging.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pim_server=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting Pharmacy Inventory Server");
    tracing::info!("Environment: {}", config.environment);

    let provider = insight_provider(&config)?;
    tracing::info!("Insight provider: {:?}", config.insights.provider);

    // Create application state
    let state = AppState {
        inventory: InventoryService::new(
            config.ledger.policy(),
            config.ledger.tax_rate,
            config.ledger.expiry_window_days,
        ),
        insights: InsightService::new(provider),
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick the insight provider named in configuration
fn insight_provider(config: &Config) -> AppResult<Arc<dyn InsightProvider>> {
    let insights = &config.insights;
    match insights.provider {
        InsightProviderKind::Static => Ok(Arc::new(StaticInsightProvider::default())),
        InsightProviderKind::Gemini => {
            let api_key = insights.api_key.clone().ok_or_else(|| {
                AppError::Configuration(
                    "insights.api_key is required for the gemini provider".to_string(),
                )
            })?;
            let client = GeminiClient::new(
                insights.api_endpoint.clone(),
                api_key,
                insights.model.clone(),
                insights.timeout_secs,
            )?;
            Ok(Arc::new(client))
        }
    }
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Pharmacy Inventory Ledger API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
