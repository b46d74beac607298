//! Insight service: free-form suggestions from a text-generation provider
//!
//! Prompts embed a JSON summary of current state. Provider failures never
//! reach the caller; each panel has its own fallback text.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use shared::{Product, StockUnit, Transaction};

use crate::error::AppResult;
use crate::services::inventory::InsightContext;

const RECENT_SALES_FOR_INVENTORY: usize = 5;
const RECENT_SALES_FOR_PHARMACY: usize = 10;

/// Something that turns a prompt into text
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn summarize(&self, prompt: &str) -> AppResult<String>;
}

/// Offline provider returning fixed text
#[derive(Debug, Clone)]
pub struct StaticInsightProvider {
    text: String,
}

impl StaticInsightProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for StaticInsightProvider {
    fn default() -> Self {
        Self::new("Insight provider is not configured.")
    }
}

#[async_trait]
impl InsightProvider for StaticInsightProvider {
    async fn summarize(&self, _prompt: &str) -> AppResult<String> {
        Ok(self.text.clone())
    }
}

/// Which panel an insight is for, with its fallback texts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Inventory,
    Forecast,
    Pharmacy,
}

impl Panel {
    fn when_empty(self) -> &'static str {
        match self {
            Panel::Inventory => "No insights available at the moment.",
            Panel::Forecast => "Forecasting data unavailable.",
            Panel::Pharmacy => "No suggestions for this pharmacy.",
        }
    }

    fn when_failed(self) -> &'static str {
        match self {
            Panel::Inventory => "Failed to fetch AI insights.",
            Panel::Forecast => "Forecasting system offline.",
            Panel::Pharmacy => "Replenishment engine busy.",
        }
    }
}

/// Insight text split into display lines
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InsightReport {
    pub lines: Vec<String>,
    /// True when the provider failed or returned nothing
    pub fallback: bool,
}

/// Insight service
#[derive(Clone)]
pub struct InsightService {
    provider: Arc<dyn InsightProvider>,
}

impl InsightService {
    pub fn new(provider: Arc<dyn InsightProvider>) -> Self {
        Self { provider }
    }

    /// Three actionable observations about the whole inventory
    pub async fn inventory_insights(&self, ctx: &InsightContext) -> InsightReport {
        let prompt = inventory_prompt(ctx);
        self.ask(Panel::Inventory, &prompt).await
    }

    /// Items the warehouse should reorder, with quantities
    pub async fn replenishment_forecast(&self, ctx: &InsightContext) -> InsightReport {
        let prompt = forecast_prompt(ctx);
        self.ask(Panel::Forecast, &prompt).await
    }

    /// Products one pharmacy should request from the warehouse
    pub async fn pharmacy_suggestions(
        &self,
        pharmacy_id: &str,
        ctx: &InsightContext,
    ) -> InsightReport {
        let prompt = pharmacy_prompt(pharmacy_id, ctx);
        self.ask(Panel::Pharmacy, &prompt).await
    }

    async fn ask(&self, panel: Panel, prompt: &str) -> InsightReport {
        match self.provider.summarize(prompt).await {
            Ok(text) => {
                let lines = split_lines(&text);
                if lines.is_empty() {
                    fallback(panel.when_empty())
                } else {
                    InsightReport {
                        lines,
                        fallback: false,
                    }
                }
            }
            Err(e) => {
                tracing::warn!(panel = ?panel, error = %e, "Insight provider failed");
                fallback(panel.when_failed())
            }
        }
    }
}

fn fallback(text: &str) -> InsightReport {
    InsightReport {
        lines: vec![text.to_string()],
        fallback: true,
    }
}

/// Split on newlines, dropping blank lines
fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn product_name<'a>(products: &'a [Product], product_id: &str) -> Option<&'a str> {
    products
        .iter()
        .find(|p| p.id == product_id)
        .map(|p| p.name.as_str())
}

/// Transactions are stored newest first
fn recent_sales(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    transactions.iter().filter(|t| t.is_sale()).take(limit).collect()
}

fn inventory_prompt(ctx: &InsightContext) -> String {
    let summary = json!({
        "totalProducts": ctx.products.len(),
        "stockCount": ctx.stock.len(),
        "recentSales": recent_sales(&ctx.transactions, RECENT_SALES_FOR_INVENTORY),
    });

    format!(
        "Act as a senior supply chain analyst for a pharmacy network.\n\
         Review this inventory summary and provide 3 brief, actionable insights:\n\
         {}\n\
         Focus on potential shortages, waste reduction and sales optimization.\n\
         Format your response as a simple list.",
        summary
    )
}

fn forecast_prompt(ctx: &InsightContext) -> String {
    let inventory: Vec<_> = ctx
        .stock
        .iter()
        .map(|s| {
            let product = ctx.products.iter().find(|p| p.id == s.product_id);
            json!({
                "name": product.map(|p| p.name.as_str()),
                "location": s.location_id,
                "qty": s.quantity,
                "threshold": product.map(|p| p.low_stock_threshold),
            })
        })
        .collect();
    let sales: Vec<_> = ctx
        .transactions
        .iter()
        .filter(|t| t.is_sale())
        .map(|t| {
            json!({
                "name": product_name(&ctx.products, &t.product_id),
                "qty": t.quantity,
                "date": t.created_at,
            })
        })
        .collect();
    let data = json!({ "inventory": inventory, "salesHistory": sales });

    format!(
        "Based on the current stock levels and sales history, suggest which 3 items need replenishment urgently.\n\
         Provide a recommended reorder quantity for each.\n\
         Data: {}\n\
         Format: Product Name - Recommended Quantity - Reason",
        data
    )
}

fn pharmacy_prompt(pharmacy_id: &str, ctx: &InsightContext) -> String {
    let stock: Vec<_> = ctx
        .stock
        .iter()
        .filter(|s| s.location_id == pharmacy_id)
        .map(|s: &StockUnit| {
            json!({
                "name": product_name(&ctx.products, &s.product_id),
                "qty": s.quantity,
            })
        })
        .collect();
    let sales: Vec<&Transaction> = ctx
        .transactions
        .iter()
        .filter(|t| t.is_sale() && t.kind.from_id() == pharmacy_id)
        .take(RECENT_SALES_FOR_PHARMACY)
        .collect();

    format!(
        "Pharmacy {} analysis:\n\
         Current Stock: {}\n\
         Recent Sales: {}\n\
         Suggest 3 products this specific pharmacy should request from the central warehouse and why.",
        pharmacy_id,
        json!(stock),
        json!(sales)
    )
}
