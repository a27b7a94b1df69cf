//! The cart: an ordered sequence of line entries and its pure transitions.
//!
//! Every mutation here is a pure function from one cart value to the next (or
//! to a [`CartRejection`]). Nothing in this module touches storage or the
//! network; the `cart` crate commits a computed state by persisting it and
//! swapping it in as the new snapshot. That split keeps the business rules
//! testable without any collaborator in the room.
//!
//! Invariants maintained by the transitions:
//! - at most one entry per product id
//! - entry quantities are >= 1 and never exceed the stock amount supplied to
//!   the transition that last touched the entry
//! - insertion order is the order products were first added

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::product::Product;

/// A business-rule rejection of a cart transition.
///
/// These are the two outcomes a caller can branch on without any collaborator
/// being involved; lookup failures live in the `cart` crate's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartRejection {
    /// The requested quantity exceeds what the inventory service has.
    #[error("requested quantity {requested} exceeds available stock ({available})")]
    StockExceeded {
        /// Quantity the transition asked for.
        requested: u32,
        /// Stock amount reported by the inventory service.
        available: u32,
    },

    /// The target product has no entry in the cart.
    #[error("no cart entry for product {0}")]
    EntryNotFound(ProductId),
}

/// A product plus the quantity the user intends to purchase.
///
/// Serializes flat (id, title, price, image, quantity) so the persisted
/// payload round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The product this line is for.
    #[serde(flatten)]
    pub product: Product,
    /// Units of the product in the cart, always >= 1.
    pub quantity: u32,
}

impl CartEntry {
    /// Create an entry for `product` at the given quantity.
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Product identifier of this line.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// An ordered sequence of [`CartEntry`], insertion order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a cart from an already-ordered entry sequence (hydration).
    #[must_use]
    pub fn from_entries(entries: Vec<CartEntry>) -> Self {
        Self { entries }
    }

    /// The entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of distinct lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry for `id`, if present.
    #[must_use]
    pub fn entry(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product_id() == id)
    }

    /// Whether the cart has an entry for `id`.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.entry(id).is_some()
    }

    /// Total units across all lines (the cart badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// A cart with the entry for `id` incremented by one unit.
    ///
    /// # Errors
    ///
    /// `StockExceeded` when the incremented quantity would exceed
    /// `available`; `EntryNotFound` when `id` has no entry.
    pub fn with_incremented(&self, id: ProductId, available: u32) -> Result<Self, CartRejection> {
        let current = self
            .entry(id)
            .ok_or(CartRejection::EntryNotFound(id))?
            .quantity;
        // A full-range quantity cannot be incremented; no stock covers it.
        let Some(requested) = current.checked_add(1) else {
            return Err(CartRejection::StockExceeded {
                requested: u32::MAX,
                available,
            });
        };
        if requested > available {
            return Err(CartRejection::StockExceeded {
                requested,
                available,
            });
        }
        Ok(self.replacing_quantity(id, requested))
    }

    /// A cart with a fresh entry for `product` appended at quantity one.
    ///
    /// Stock is not re-verified on this path: a product the catalog still
    /// lists is assumed to have at least one unit. Callers must check
    /// [`Self::contains`] first; appending an id that is already present
    /// would break the one-entry-per-product invariant.
    #[must_use]
    pub fn with_added(&self, product: Product) -> Self {
        debug_assert!(!self.contains(product.id));
        let mut entries = self.entries.clone();
        entries.push(CartEntry::new(product, 1));
        Self { entries }
    }

    /// A cart with the entry for `id` set to `quantity` units.
    ///
    /// The stock bound is checked before entry presence, so an over-stock
    /// request for an absent entry reports `StockExceeded`.
    ///
    /// # Errors
    ///
    /// `StockExceeded` when `quantity` exceeds `available`; `EntryNotFound`
    /// when `id` has no entry.
    pub fn with_quantity(
        &self,
        id: ProductId,
        quantity: u32,
        available: u32,
    ) -> Result<Self, CartRejection> {
        if quantity > available {
            return Err(CartRejection::StockExceeded {
                requested: quantity,
                available,
            });
        }
        if !self.contains(id) {
            return Err(CartRejection::EntryNotFound(id));
        }
        Ok(self.replacing_quantity(id, quantity))
    }

    /// A cart without the entry for `id`, remaining order preserved.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` when `id` has no entry.
    pub fn without(&self, id: ProductId) -> Result<Self, CartRejection> {
        if !self.contains(id) {
            return Err(CartRejection::EntryNotFound(id));
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| e.product_id() != id)
            .cloned()
            .collect();
        Ok(Self { entries })
    }

    fn replacing_quantity(&self, id: ProductId, quantity: u32) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|e| {
                if e.product_id() == id {
                    CartEntry::new(e.product.clone(), quantity)
                } else {
                    e.clone()
                }
            })
            .collect();
        Self { entries }
    }
}
