//! HTTP handlers for the Pharmacy Inventory API

pub mod catalog;
pub mod checkout;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod insights;
pub mod ledger;
pub mod requests;

pub use catalog::*;
pub use checkout::*;
pub use customers::*;
pub use dashboard::*;
pub use health::*;
pub use insights::*;
pub use ledger::*;
pub use requests::*;
