//! Business logic services for the Pharmacy Inventory server

pub mod insight;
pub mod inventory;

pub use insight::{InsightProvider, InsightService, StaticInsightProvider};
pub use inventory::InventoryService;
