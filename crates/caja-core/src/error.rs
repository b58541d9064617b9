//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  caja-core errors (this file)                                 │
//! │  ├── ValidationError  - catalog input failures                │
//! │  ├── CheckoutError    - sale-commit rejections (Validating)   │
//! │  └── CoreError        - umbrella for both                     │
//! │                                                               │
//! │  caja-store errors (separate crate)                           │
//! │  └── StoreError       - persistence failures, wraps CoreError │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries a user-facing message: rejections are recovered
//! locally by the operator correcting the input and retrying.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Catalog input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. malformed tax id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Sale-commit rejections, raised in the Validating step.
///
/// Each rejection is terminal for the attempt: nothing has been written
/// and the operator retries after correcting the cart or inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The cart holds no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A line carries a non-positive quantity.
    #[error("Quantity for '{name}' must be positive (got {quantity})")]
    NonPositiveQuantity { name: String, quantity: i64 },

    /// The document type requires an 11-digit client tax id.
    #[error("Client tax id must be exactly 11 digits")]
    InvalidClientTaxId,

    /// No vendor was supplied by the session.
    #[error("A vendor must be selected")]
    MissingVendor,

    /// Discount cannot be negative.
    #[error("Discount must not be negative")]
    NegativeDiscount,

    /// A supplied payment is below the total. A payment of zero (or none)
    /// means "pay later / unspecified" and bypasses this check.
    #[error("Payment of {payment_cents} cents is below the total of {total_cents} cents")]
    InsufficientPayment { payment_cents: i64, total_cents: i64 },
}

// =============================================================================
// Core Error
// =============================================================================

/// Umbrella error for the pure business layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Checkout rejected: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Convenience alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_error_messages() {
        assert_eq!(CheckoutError::EmptyCart.to_string(), "Cart is empty");

        let err = CheckoutError::NonPositiveQuantity {
            name: "Arroz".to_string(),
            quantity: 0,
        };
        assert_eq!(
            err.to_string(),
            "Quantity for 'Arroz' must be positive (got 0)"
        );
    }

    #[test]
    fn test_validation_error_converts_to_core_error() {
        let err: CoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
