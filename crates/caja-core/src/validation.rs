//! # Validation Module
//!
//! Input validation for catalog mutations and checkout fields.
//!
//! Category and unit values are free-form strings checked only for
//! non-emptiness, never for existence in the tag tables. A product can
//! therefore reference a deleted tag name; display falls back to the
//! stale name (tolerated referential gap).

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length for product, category, unit and vendor names.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, category, unit, vendor).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a client tax id: exactly 11 ASCII digits.
pub fn validate_client_tax_id(tax_id: &str) -> ValidationResult<()> {
    let tax_id = tax_id.trim();

    if tax_id.len() != 11 || !tax_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "client_tax_id".to_string(),
            reason: "must be exactly 11 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a cart line quantity. Must be strictly positive.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a product input payload before insert/update.
pub fn validate_product_input(input: &crate::types::ProductInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_price_cents(input.price_cents)?;
    validate_name("category", &input.category)?;
    validate_name("unit", &input.unit)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductInput;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Arroz Extra").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_client_tax_id() {
        assert!(validate_client_tax_id("20602953638").is_ok());
        assert!(validate_client_tax_id("2060295363").is_err()); // 10 digits
        assert!(validate_client_tax_id("206029536389").is_err()); // 12 digits
        assert!(validate_client_tax_id("2060295363X").is_err()); // non-digit
        assert!(validate_client_tax_id("").is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(450).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
    }

    #[test]
    fn test_validate_product_input() {
        let mut input = ProductInput {
            name: "Arroz".to_string(),
            price_cents: 450,
            category: "Abarrotes".to_string(),
            unit: "kg".to_string(),
            image: None,
            stock: 10,
        };
        assert!(validate_product_input(&input).is_ok());

        input.price_cents = -1;
        assert!(validate_product_input(&input).is_err());

        input.price_cents = 450;
        input.category = "".to_string();
        assert!(validate_product_input(&input).is_err());
    }
}
