//! Validation utilities for the Pharmacy Inventory platform
//!
//! Checks run on user input before anything reaches the ledger. The ledger
//! reducer itself never validates; it absorbs whatever it is given.

use rust_decimal::Decimal;

use crate::models::{Product, StockUnit};
use crate::types::is_stock_location;

// ============================================================================
// Catalog Validations
// ============================================================================

/// Highest unit price or cost the catalog and ledger accept
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Validate a product's pricing: both prices within `0..=MAX_UNIT_PRICE`
pub fn validate_pricing(unit_price: Decimal, unit_cost: Decimal) -> Result<(), &'static str> {
    if unit_price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err("Unit price is too large");
    }
    if unit_cost < Decimal::ZERO {
        return Err("Unit cost cannot be negative");
    }
    if unit_cost > MAX_UNIT_PRICE {
        return Err("Unit cost is too large");
    }
    Ok(())
}

/// Check whether a product sells below its cost
pub fn is_sold_at_loss(product: &Product) -> bool {
    product.unit_margin() < Decimal::ZERO
}

/// Validate catalog identifiers (1-64 chars, alphanumeric, '-' or '_')
pub fn validate_identifier(id: &str) -> Result<(), &'static str> {
    if id.is_empty() {
        return Err("Identifier cannot be empty");
    }
    if id.len() > 64 {
        return Err("Identifier must be at most 64 characters");
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Identifier may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

/// Validate batch number format (e.g. "BAT-001"): uppercase alphanumeric and '-'
pub fn validate_batch_number(batch: &str) -> Result<(), &'static str> {
    if batch.len() < 3 {
        return Err("Batch number must be at least 3 characters");
    }
    if batch.len() > 32 {
        return Err("Batch number must be at most 32 characters");
    }
    if !batch
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Batch number must be uppercase alphanumeric");
    }
    Ok(())
}

// ============================================================================
// Ledger Input Validations
// ============================================================================

/// Movements must carry at least one unit
pub fn validate_movement_quantity(quantity: u32) -> Result<(), &'static str> {
    if quantity == 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a location that should hold stock (not the customer/supplier side)
pub fn validate_stock_location(location_id: &str) -> Result<(), &'static str> {
    validate_identifier(location_id)?;
    if !is_stock_location(location_id) {
        return Err("Location does not hold stock");
    }
    Ok(())
}

/// Validate a transfer's endpoints
pub fn validate_transfer_route(from_id: &str, to_id: &str) -> Result<(), &'static str> {
    validate_stock_location(from_id)?;
    validate_stock_location(to_id)?;
    if from_id == to_id {
        return Err("Transfer source and destination must differ");
    }
    Ok(())
}

/// Check a cart line against the record it draws from
pub fn validate_cart_line(unit: &StockUnit, quantity: u32) -> Result<(), &'static str> {
    validate_movement_quantity(quantity)?;
    if quantity > unit.quantity {
        return Err("Cart quantity exceeds stock on hand");
    }
    Ok(())
}

/// Discounts cannot be negative
pub fn validate_discount(discount: Decimal) -> Result<(), &'static str> {
    if discount < Decimal::ZERO {
        return Err("Discount cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Customer Validations
// ============================================================================

/// Validate phone number: 7-15 digits, optional leading '+', separators allowed
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == '-' || c == ' ')
    {
        return Err("Phone number may only contain digits, spaces and '-'");
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err("Phone number must have 7 to 15 digits");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_pricing() {
        assert!(validate_pricing(dec("12.50"), dec("8.00")).is_ok());
        assert!(validate_pricing(dec("0"), dec("0")).is_ok());
        assert!(validate_pricing(dec("-1"), dec("8.00")).is_err());
        assert!(validate_pricing(dec("1"), dec("-0.01")).is_err());
    }

    #[test]
    fn test_validate_pricing_rejects_extreme_prices() {
        assert!(validate_pricing(MAX_UNIT_PRICE, MAX_UNIT_PRICE).is_ok());
        assert_eq!(
            validate_pricing(Decimal::MAX, dec("8.00")),
            Err("Unit price is too large")
        );
        assert_eq!(
            validate_pricing(dec("1"), MAX_UNIT_PRICE + Decimal::ONE),
            Err("Unit cost is too large")
        );
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("p1").is_ok());
        assert!(validate_identifier("branch_north-2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("has space").is_err());
        assert!(validate_identifier(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_batch_number() {
        assert!(validate_batch_number("BAT-001").is_ok());
        assert!(validate_batch_number("B1").is_err());
        assert!(validate_batch_number("bat-001").is_err());
    }

    #[test]
    fn test_validate_movement_quantity() {
        assert!(validate_movement_quantity(1).is_ok());
        assert!(validate_movement_quantity(0).is_err());
    }

    #[test]
    fn test_validate_transfer_route() {
        assert!(validate_transfer_route("warehouse", "ph1").is_ok());
        assert!(validate_transfer_route("ph1", "ph1").is_err());
        assert!(validate_transfer_route("warehouse", "customer").is_err());
    }

    #[test]
    fn test_validate_cart_line() {
        let unit = StockUnit::new("p1", "BAT-001", "ph1", 5, None);
        assert!(validate_cart_line(&unit, 5).is_ok());
        assert!(validate_cart_line(&unit, 6).is_err());
        assert!(validate_cart_line(&unit, 0).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("555-0101").is_ok());
        assert!(validate_phone("+66 81 234 5678").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("555-CALL-NOW").is_err());
    }

    #[test]
    fn test_sold_at_loss() {
        let product = Product {
            id: "p1".to_string(),
            name: "Amoxicillin 500mg".to_string(),
            category: "Antibiotics".to_string(),
            brand: "Generic".to_string(),
            unit_price: dec("7.00"),
            unit_cost: dec("8.00"),
            low_stock_threshold: 100,
            compliance_status: Default::default(),
        };
        assert!(is_sold_at_loss(&product));
    }
}
