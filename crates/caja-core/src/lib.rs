//! # caja-core: Pure Business Logic for the librecaja Register
//!
//! This crate is the heart of the register. It contains all business
//! logic as pure functions and value types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  External collaborators (UI, receipt renderer, QR encoder,    │
//! │  messaging, access gate)                                      │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │ value types only
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │                 ★ caja-core (THIS CRATE) ★                    │
//! │                                                               │
//! │  ┌─────────┐ ┌───────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐  │
//! │  │  types  │ │ money │ │   cart   │ │checkout │ │ receipt │  │
//! │  └─────────┘ └───────┘ └──────────┘ └─────────┘ └─────────┘  │
//! │                                                               │
//! │  NO I/O • NO DATABASE • PURE FUNCTIONS                        │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │      caja-store: SQLite persistence, migrations, live         │
//! │      queries, the single-writer Register facade               │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Record types (Product, Sale, DailyCash, ...)
//! - [`money`] - Integer-cents Money type (no floating point)
//! - [`cart`] - Session-local cart of product snapshots
//! - [`checkout`] - Validating / Computing Totals steps of sale-commit
//! - [`receipt`] - Flat payloads for external renderers
//! - [`validation`] - Field-level input validation
//! - [`error`] - Domain error types

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use cart::{Cart, CartItem};
pub use checkout::{CheckoutRequest, CheckoutTotals};
pub use error::{CheckoutError, CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::{ReceiptLine, ReceiptPayload};
pub use types::*;
