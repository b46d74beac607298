//! Shared types and ledger logic for the Pharmacy Inventory platform
//!
//! This crate contains the domain models and the pure state-transition
//! functions shared between the backend, the browser client (via WASM),
//! and the tests. Nothing in here performs I/O.

pub mod checkout;
pub mod ledger;
pub mod models;
pub mod projections;
pub mod types;
pub mod validation;

pub use checkout::*;
pub use ledger::*;
pub use models::*;
pub use projections::*;
pub use types::*;
pub use validation::*;
