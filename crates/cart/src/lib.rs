//! Shoebox Cart - the cart store and its collaborator seams.
//!
//! # Architecture
//!
//! [`CartStore`] owns the in-memory [`Cart`](shoebox_core::Cart) and its
//! persisted mirror. Every quantity-affecting mutation validates against the
//! remote inventory service first, computes the next cart state with the pure
//! transitions from `shoebox-core`, and commits it: persist, then swap the
//! in-memory snapshot in one step. A failed mutation leaves the snapshot at
//! the last persisted state and pushes a human-readable warning through the
//! notification sink.
//!
//! Collaborators are trait seams so consumers inject their own:
//!
//! - [`InventorySource`] - product and stock lookups ([`HttpInventory`] in
//!   production)
//! - [`CartStorage`] - durable key-value text storage ([`JsonFileStorage`]
//!   in production, [`MemoryStorage`] in tests)
//! - [`NotificationSink`] - fire-and-forget warnings ([`TracingNotifier`]
//!   by default)
//!
//! # Example
//!
//! ```rust,ignore
//! use shoebox_cart::{CartStore, HttpInventory, JsonFileStorage, TracingNotifier};
//! use shoebox_core::ProductId;
//!
//! let inventory = HttpInventory::new("http://localhost:3333".parse()?);
//! let storage = JsonFileStorage::new(".shoebox")?;
//! let mut store = CartStore::hydrate(inventory, storage, TracingNotifier, "@shoebox:cart");
//!
//! store.add_item(ProductId::new(1)).await?;
//! for entry in store.cart().entries() {
//!     println!("{} x{}", entry.product.title, entry.quantity);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod error;
mod inventory;
mod notify;
mod storage;
mod store;

pub use error::{CartError, InventoryError, StorageError};
pub use inventory::{HttpInventory, InventorySource};
pub use notify::{NotificationSink, TracingNotifier, warnings};
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage};
pub use store::CartStore;
