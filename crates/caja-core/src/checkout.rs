//! # Checkout Rules
//!
//! The pure half of the sale-commit engine: the Validating and
//! Computing Totals steps of the commit state machine.
//!
//! ## Commit State Machine
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Empty ─► Validating ─► Computing Totals ─► Persisting Sale   │
//! │               │                                  │            │
//! │               ▼                                  ▼            │
//! │           Rejected                        Adjusting Stock     │
//! │     (specific reason, no                         │            │
//! │      state was touched)                          ▼            │
//! │                                              Committed        │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module owns the first two transitions. They are deterministic
//! functions over the cart and the operator's inputs, so every rejection
//! happens before a single byte is written. The persisting and stock
//! steps live in caja-store's `Register::commit_sale`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::CheckoutError;
use crate::money::Money;
use crate::types::DocumentType;
use crate::validation::validate_client_tax_id;

// =============================================================================
// Checkout Request
// =============================================================================

/// Operator inputs for a commit attempt.
///
/// The vendor is the session-supplied identity: it is passed in explicitly
/// rather than read from any ambient global, so the core needs no session
/// state of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub document_type: DocumentType,

    /// Client tax id; required (11 digits) when the document type demands it.
    pub client_tax_id: Option<String>,

    /// Vendor ringing the sale up.
    pub vendor: String,

    /// Optional operator-entered discount, non-negative.
    pub discount_cents: i64,

    /// Amount tendered. `None` or `Some(0)` means "pay later /
    /// unspecified" and is accepted; any other amount below the total is
    /// rejected.
    pub payment_cents: Option<i64>,
}

impl CheckoutRequest {
    /// A plain boleta with no discount and unspecified payment.
    pub fn boleta(vendor: impl Into<String>) -> Self {
        CheckoutRequest {
            document_type: DocumentType::Boleta,
            client_tax_id: None,
            vendor: vendor.into(),
            discount_cents: 0,
            payment_cents: None,
        }
    }
}

// =============================================================================
// Validating
// =============================================================================

/// The Validating transition.
///
/// Rejects (→ Rejected) with a specific, user-facing reason when:
/// - the cart is empty
/// - any line quantity is ≤ 0
/// - the document type requires a client tax id that is not exactly
///   11 digits
/// - no vendor was supplied
/// - the discount is negative
///
/// A rejection leaves all state untouched; the operator corrects the
/// inputs and retries.
pub fn validate(cart: &Cart, request: &CheckoutRequest) -> Result<(), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    for item in &cart.items {
        if item.quantity <= 0 {
            return Err(CheckoutError::NonPositiveQuantity {
                name: item.name.clone(),
                quantity: item.quantity,
            });
        }
    }

    if request.document_type.requires_client_tax_id() {
        let ok = request
            .client_tax_id
            .as_deref()
            .map(|id| validate_client_tax_id(id).is_ok())
            .unwrap_or(false);
        if !ok {
            return Err(CheckoutError::InvalidClientTaxId);
        }
    }

    if request.vendor.trim().is_empty() {
        return Err(CheckoutError::MissingVendor);
    }

    if request.discount_cents < 0 {
        return Err(CheckoutError::NegativeDiscount);
    }

    Ok(())
}

// =============================================================================
// Computing Totals
// =============================================================================

/// Monetary outcome of the Computing Totals transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_cents: i64,
    pub change_cents: i64,
}

/// The Computing Totals transition.
///
/// - `subtotal = Σ (line.price × line.quantity)`
/// - `total = max(0, subtotal − discount)` (discount clamped, never
///   drives the total negative)
/// - payment `None`/`Some(0)` is "unspecified": accepted, change 0
/// - payment below the total is rejected back to Validating
/// - otherwise `change = payment − total`
pub fn compute_totals(cart: &Cart, request: &CheckoutRequest) -> Result<CheckoutTotals, CheckoutError> {
    let subtotal = Money::from_cents(cart.subtotal_cents());
    let discount = Money::from_cents(request.discount_cents);
    let total = subtotal.sub_clamped(discount);

    let payment = Money::from_cents(request.payment_cents.unwrap_or(0));
    if payment.is_positive() && payment < total {
        return Err(CheckoutError::InsufficientPayment {
            payment_cents: payment.cents(),
            total_cents: total.cents(),
        });
    }

    let change = payment.sub_clamped(total);

    Ok(CheckoutTotals {
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        total_cents: total.cents(),
        payment_cents: payment.cents(),
        change_cents: change.cents(),
    })
}

// =============================================================================
// Document Numbers
// =============================================================================

/// Generates a document number: series prefix + the last six digits of
/// the commit timestamp in milliseconds, e.g. `B001-483920`.
///
/// Collisions are possible under extremely high write frequency. Known
/// weakness, kept as-is: the store is a single local writer and the
/// document number is not the primary key.
pub fn document_number(document_type: DocumentType, at: DateTime<Utc>) -> String {
    let suffix = (at.timestamp_millis().rem_euclid(1_000_000)) as u32;
    format!("{}-{:06}", document_type.series(), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use chrono::TimeZone;

    fn cart_with(lines: &[(i64, i64, i64)]) -> Cart {
        // (product_id, unit_price_cents, quantity)
        Cart {
            items: lines
                .iter()
                .map(|(id, price, qty)| CartItem {
                    product_id: Some(*id),
                    name: format!("Item {id}"),
                    category: "General".to_string(),
                    unit: "und".to_string(),
                    unit_price_cents: *price,
                    quantity: *qty,
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_rejects_empty_cart() {
        let cart = Cart::new();
        let req = CheckoutRequest::boleta("Turno Mañana");
        assert_eq!(validate(&cart, &req), Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        let cart = cart_with(&[(1, 450, 0)]);
        let req = CheckoutRequest::boleta("Turno Mañana");
        assert!(matches!(
            validate(&cart, &req),
            Err(CheckoutError::NonPositiveQuantity { quantity: 0, .. })
        ));
    }

    #[test]
    fn test_validate_factura_requires_11_digit_tax_id() {
        let cart = cart_with(&[(1, 450, 1)]);
        let mut req = CheckoutRequest::boleta("Admin");
        req.document_type = DocumentType::Factura;

        // Missing entirely
        assert_eq!(
            validate(&cart, &req),
            Err(CheckoutError::InvalidClientTaxId)
        );

        // Too short
        req.client_tax_id = Some("123456789".to_string());
        assert_eq!(
            validate(&cart, &req),
            Err(CheckoutError::InvalidClientTaxId)
        );

        // Exactly 11 digits
        req.client_tax_id = Some("20602953638".to_string());
        assert_eq!(validate(&cart, &req), Ok(()));

        // Boleta never requires it
        req.document_type = DocumentType::Boleta;
        req.client_tax_id = None;
        assert_eq!(validate(&cart, &req), Ok(()));
    }

    #[test]
    fn test_validate_rejects_missing_vendor() {
        let cart = cart_with(&[(1, 450, 1)]);
        let req = CheckoutRequest::boleta("   ");
        assert_eq!(validate(&cart, &req), Err(CheckoutError::MissingVendor));
    }

    #[test]
    fn test_totals_reference_scenario() {
        // cart = [{4.50 × 2}, {11.00 × 1}], discount 1.00, payment 25.00
        let cart = cart_with(&[(1, 450, 2), (2, 1100, 1)]);
        let mut req = CheckoutRequest::boleta("Admin");
        req.discount_cents = 100;
        req.payment_cents = Some(2500);

        let totals = compute_totals(&cart, &req).unwrap();
        assert_eq!(totals.subtotal_cents, 2000);
        assert_eq!(totals.total_cents, 1900);
        assert_eq!(totals.change_cents, 600);
    }

    #[test]
    fn test_totals_discount_clamped_at_zero() {
        let cart = cart_with(&[(1, 450, 1)]);
        let mut req = CheckoutRequest::boleta("Admin");
        req.discount_cents = 900;

        let totals = compute_totals(&cart, &req).unwrap();
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn test_totals_underpayment_rejected() {
        let cart = cart_with(&[(1, 1000, 1)]);
        let mut req = CheckoutRequest::boleta("Admin");
        req.payment_cents = Some(500);

        assert_eq!(
            compute_totals(&cart, &req),
            Err(CheckoutError::InsufficientPayment {
                payment_cents: 500,
                total_cents: 1000,
            })
        );
    }

    #[test]
    fn test_totals_zero_payment_means_unspecified() {
        // Observed behavior preserved: payment 0 / absent bypasses the
        // insufficient-funds check and commits with change 0.
        let cart = cart_with(&[(1, 1000, 1)]);
        let mut req = CheckoutRequest::boleta("Admin");

        req.payment_cents = None;
        let totals = compute_totals(&cart, &req).unwrap();
        assert_eq!(totals.payment_cents, 0);
        assert_eq!(totals.change_cents, 0);

        req.payment_cents = Some(0);
        let totals = compute_totals(&cart, &req).unwrap();
        assert_eq!(totals.change_cents, 0);
    }

    #[test]
    fn test_document_number_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 15, 30, 45).unwrap();
        let number = document_number(DocumentType::Boleta, at);
        assert!(number.starts_with("B001-"));
        assert_eq!(number.len(), "B001-".len() + 6);

        let factura = document_number(DocumentType::Factura, at);
        assert!(factura.starts_with("F001-"));
    }
}
