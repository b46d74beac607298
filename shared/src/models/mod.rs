//! Domain models for the Pharmacy Inventory platform

mod alert;
mod audit;
mod customer;
mod product;
mod request;
mod stock;
mod transaction;

pub use alert::*;
pub use audit::*;
pub use customer::*;
pub use product::*;
pub use request::*;
pub use stock::*;
pub use transaction::*;
