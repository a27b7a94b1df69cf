//! Shoebox Core - Shared types library.
//!
//! This crate provides the domain types used across all Shoebox components:
//! - `cart` - The `CartStore` component and its collaborator seams
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage access. The cart transition functions here compute new
//! cart states; committing a state (persisting it) is the `cart` crate's job.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, products, stock records, and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
