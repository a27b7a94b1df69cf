//! Error types for the cart store and its collaborators.
//!
//! Mutations never panic and never throw past the operation boundary: every
//! outcome is a `Result<(), CartError>` whose variant a caller can branch on,
//! while the human-readable side of the same failure goes through the
//! notification sink.

use thiserror::Error;

use shoebox_core::{CartRejection, ProductId};

/// Errors from the remote inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service has no record for this product.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The service answered with an unexpected status.
    #[error("inventory service returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the persistent storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the cart for storage failed.
    #[error("cart encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outcome of a failed cart mutation.
///
/// The first two variants are business-rule rejections after a successful
/// inventory lookup; the last two are collaborator failures. In every case
/// the cart is left unchanged.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity exceeds available stock.
    #[error("requested quantity {requested} exceeds available stock ({available})")]
    StockExceeded {
        /// Quantity the mutation asked for.
        requested: u32,
        /// Stock amount reported by the inventory service.
        available: u32,
    },

    /// The target product has no entry in the cart.
    #[error("no cart entry for product {0}")]
    EntryNotFound(ProductId),

    /// The inventory lookup failed.
    #[error("inventory lookup failed: {0}")]
    Inventory(#[from] InventoryError),

    /// Persisting the new cart state failed; the in-memory cart stays at the
    /// last persisted snapshot.
    #[error("cart persistence failed: {0}")]
    Storage(#[from] StorageError),
}

impl From<CartRejection> for CartError {
    fn from(rejection: CartRejection) -> Self {
        match rejection {
            CartRejection::StockExceeded {
                requested,
                available,
            } => Self::StockExceeded {
                requested,
                available,
            },
            CartRejection::EntryNotFound(id) => Self::EntryNotFound(id),
        }
    }
}
