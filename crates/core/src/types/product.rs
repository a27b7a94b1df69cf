//! Catalog records returned by the remote inventory service.
//!
//! Both types are snapshots: the inventory service owns them, and stock in
//! particular is re-fetched before every quantity-affecting cart mutation
//! rather than cached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A catalog product as served by the inventory service.
///
/// Immutable once fetched; the price uses decimal arithmetic, never floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier, also the lookup key for stock.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Image URL for display.
    pub image: String,
}

/// Units of a product currently available for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Matches the [`Product`] identifier.
    pub id: ProductId,
    /// Available quantity, never negative.
    pub amount: u32,
}
