//! # Domain Types
//!
//! Core record types held by the schema store.
//!
//! ## Ownership Rules
//! No entity is shared by reference across tables. Cross-references are
//! either a **name lookup** (Product -> category/unit by name) or a
//! **denormalized value copy** (Sale lines are frozen snapshots), so a
//! later catalog edit can never retroactively change a historical sale.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Product ──(by name)──► Category / Unit                       │
//! │     │                                                         │
//! │     └──(full copy at commit)──► SaleLine (inside Sale)        │
//! │                                                               │
//! │  Sale is immutable once appended; its lines never change.     │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Document Type
// =============================================================================

/// The two supported receipt kinds.
///
/// A `Factura` is issued against a registered business and requires the
/// client's 11-digit tax id; a `Boleta` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Boleta,
    Factura,
}

impl DocumentType {
    /// Series prefix used when generating document numbers.
    pub const fn series(&self) -> &'static str {
        match self {
            DocumentType::Boleta => "B001",
            DocumentType::Factura => "F001",
        }
    }

    /// Whether committing under this document type requires the client's
    /// 11-digit tax id.
    pub const fn requires_client_tax_id(&self) -> bool {
        matches!(self, DocumentType::Factura)
    }

    /// Label used on receipts and share messages.
    pub const fn label(&self) -> &'static str {
        match self {
            DocumentType::Boleta => "BOLETA",
            DocumentType::Factura => "FACTURA",
        }
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Boleta
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entity available for sale.
///
/// `category` and `unit` reference tag tables **by name**, not by id.
/// Deleting a tag does not cascade here; a product may carry a stale name
/// and display falls back to showing it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Auto-assigned integer identifier.
    pub id: i64,

    /// Display name shown in the catalog and on receipts.
    pub name: String,

    /// Unit price in cents. Non-negative on create/update.
    pub price_cents: i64,

    /// Category name (free-form, validated for non-emptiness only).
    pub category: String,

    /// Unit-of-measure name (free-form, validated for non-emptiness only).
    pub unit: String,

    /// Optional image payload (data URL or path; opaque to the core).
    pub image: Option<String>,

    /// Stock on hand. Intended non-negative but not enforced: the
    /// sale-commit engine decrements unconditionally and a ledger
    /// reconciliation pass is the recovery story.
    pub stock: i64,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Payload for creating or updating a product (no identifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price_cents: i64,
    pub category: String,
    pub unit: String,
    pub image: Option<String>,
    pub stock: i64,
}

// =============================================================================
// Named Tags
// =============================================================================

/// A category tag, referenced from products by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A unit-of-measure tag, referenced from products by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Unit {
    pub id: i64,
    pub name: String,
}

/// A vendor identity (cashier / shift). The access gate authenticates
/// outside the core; the core only consumes whichever name it is handed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Business Configuration
// =============================================================================

/// Singleton business identity record, stamped onto receipts.
///
/// Stored under a fixed key; mutated only by administration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BusinessConfig {
    pub name: String,
    pub tax_id: String,
    pub address: String,
    pub phone: String,
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable line item inside a sale.
///
/// Full snapshot of the product's display fields at commit time. Holds no
/// live reference: `product_id` is kept only so stock adjustment and
/// ledger reconciliation can find the product again, and is `None` for
/// lines whose product was never cataloged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A committed sale: an immutable ledger entry.
///
/// ## Invariants (financial audit integrity)
/// - `total_cents = max(0, subtotal_cents - discount_cents)`
/// - `change_cents = max(0, payment_cents - total_cents)`
/// - `lines` is never mutated after the sale is appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Auto-assigned integer identifier.
    pub id: i64,

    pub document_type: DocumentType,

    /// Series-prefixed document number, e.g. `B001-483920`.
    pub document_number: String,

    /// Commit timestamp (UTC).
    pub created_at: DateTime<Utc>,

    /// Local calendar day the sale belongs to (`YYYY-MM-DD`). The cash
    /// drawer reconciles per local day, not per UTC day.
    pub day: String,

    /// Vendor who rang the sale up.
    pub vendor: String,

    /// Client tax id; present and 11 digits when the document type
    /// requires it.
    pub client_tax_id: Option<String>,

    /// Ordered, frozen line items.
    pub lines: Vec<SaleLine>,

    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,

    /// Amount tendered. Zero means "unspecified / pay later".
    pub payment_cents: i64,
    pub change_cents: i64,
}

impl Sale {
    /// Returns the final total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Daily Cash
// =============================================================================

/// Opening float for one calendar day.
///
/// Keyed by the local day string; re-entering an amount for the same day
/// overwrites the prior value (last write wins, no edit history). The
/// drawer total is always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DailyCash {
    pub day: String,
    pub opening_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_series() {
        assert_eq!(DocumentType::Boleta.series(), "B001");
        assert_eq!(DocumentType::Factura.series(), "F001");
    }

    #[test]
    fn test_document_type_tax_id_requirement() {
        assert!(!DocumentType::Boleta.requires_client_tax_id());
        assert!(DocumentType::Factura.requires_client_tax_id());
    }

    #[test]
    fn test_sale_line_money_views() {
        let line = SaleLine {
            product_id: Some(1),
            name: "Arroz".to_string(),
            category: "Abarrotes".to_string(),
            unit: "kg".to_string(),
            unit_price_cents: 450,
            quantity: 2,
            line_total_cents: 900,
        };
        assert_eq!(line.unit_price().cents(), 450);
        assert_eq!(line.line_total().cents(), 900);
    }
}
