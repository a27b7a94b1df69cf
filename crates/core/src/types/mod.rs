//! Core types for Shoebox.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{Cart, CartEntry, CartRejection};
pub use id::*;
pub use product::{Product, StockRecord};
