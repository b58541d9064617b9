//! # Cart
//!
//! The transient, session-local selection of catalog items.
//!
//! A cart is owned exclusively by the active terminal session. It lives in
//! memory only and is never persisted: commit consumes it into an immutable
//! sale, cancellation simply drops it.
//!
//! ## Snapshot Pattern
//! Adding a product copies its display fields into the [`CartItem`]. The
//! cart keeps no live reference to the catalog, so a price edit after the
//! item was added does not change what the customer is charged.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Product, SaleLine};

// =============================================================================
// Cart Item
// =============================================================================

/// A full snapshot of a product's display fields plus a mutable quantity.
///
/// Has no identity beyond the product id it was copied from; discarded on
/// commit or cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog id the snapshot was taken from.
    pub product_id: Option<i64>,

    /// Name at time of adding (frozen).
    pub name: String,

    /// Category name at time of adding (frozen).
    pub category: String,

    /// Unit-of-measure name at time of adding (frozen).
    pub unit: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity in cart. Expected > 0; checkout validation rejects
    /// anything else.
    pub quantity: i64,
}

impl CartItem {
    /// Snapshots a product into a cart item.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: Some(product.id),
            name: product.name.clone(),
            category: product.category.clone(),
            unit: product.unit.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    /// Line total (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        Money::from_cents(self.unit_price_cents)
            .multiply_quantity(self.quantity)
            .cents()
    }

    /// Freezes this item into an immutable sale line.
    pub fn to_sale_line(&self) -> SaleLine {
        SaleLine {
            product_id: self.product_id,
            name: self.name.clone(),
            category: self.category.clone(),
            unit: self.unit.clone(),
            unit_price_cents: self.unit_price_cents,
            quantity: self.quantity,
            line_total_cents: self.line_total_cents(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The session cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product again
///   accumulates quantity)
/// - Setting a quantity to 0 removes the item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cart {
    /// Ordered items; order is preserved onto the receipt.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product snapshot, or accumulates quantity if the product is
    /// already in the cart.
    pub fn add_product(&mut self, product: &Product, quantity: i64) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == Some(product.id))
        {
            item.quantity += quantity;
            return;
        }

        self.items.push(CartItem::from_product(product, quantity));
    }

    /// Sets the quantity of an item; 0 removes it.
    ///
    /// Returns false if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }

        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == Some(product_id))
        {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Removes an item by product id. Returns false if absent.
    pub fn remove(&mut self, product_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != Some(product_id));
        self.items.len() != before
    }

    /// Discards all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Subtotal across all lines.
    pub fn subtotal_cents(&self) -> i64 {
        self.items.iter().map(|i| i.line_total_cents()).sum()
    }

    /// True when the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price_cents: i64) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            price_cents,
            category: "Abarrotes".to_string(),
            unit: "und".to_string(),
            image: None,
            stock: 10,
        }
    }

    #[test]
    fn test_add_product_snapshots_fields() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 450), 2);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items[0].unit_price_cents, 450);
        assert_eq!(cart.subtotal_cents(), 900);
    }

    #[test]
    fn test_add_same_product_accumulates_quantity() {
        let mut cart = Cart::new();
        let p = product(1, 450);

        cart.add_product(&p, 2);
        cart.add_product(&p, 3);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_price_edit_after_add_does_not_change_cart() {
        let mut cart = Cart::new();
        let mut p = product(1, 450);
        cart.add_product(&p, 1);

        p.price_cents = 999; // catalog edit after the fact
        assert_eq!(cart.subtotal_cents(), 450);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 450), 2);

        assert!(cart.set_quantity(1, 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_returns_false() {
        let mut cart = Cart::new();
        assert!(!cart.remove(99));
        assert!(!cart.set_quantity(99, 3));
    }

    #[test]
    fn test_to_sale_line_totals() {
        let mut cart = Cart::new();
        cart.add_product(&product(7, 1100), 1);

        let line = cart.items[0].to_sale_line();
        assert_eq!(line.product_id, Some(7));
        assert_eq!(line.line_total_cents, 1100);
    }
}
