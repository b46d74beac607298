//! Customer and loyalty models

use serde::{Deserialize, Serialize};

/// A registered point-of-sale customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub loyalty_points: u32,
    /// Ids of confirmed sales credited to this customer
    #[serde(default)]
    pub history: Vec<String>,
}

impl Customer {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            loyalty_points: 0,
            history: Vec::new(),
        }
    }
}
