//! Remote inventory collaborator.
//!
//! The inventory service is the source of truth for products and stock.
//! Stock is looked up fresh before every quantity-affecting mutation; nothing
//! here is cached.

use tracing::debug;

use shoebox_core::{Product, ProductId, StockRecord};

use crate::error::InventoryError;

/// Identifier-keyed lookups against the inventory service.
///
/// Implementations may fail with a not-found or transport error; the store
/// treats any failure as a collaborator error and leaves the cart unchanged.
#[allow(async_fn_in_trait)]
pub trait InventorySource {
    /// Fetch the stock record for a product.
    async fn fetch_stock(&self, id: ProductId) -> Result<StockRecord, InventoryError>;

    /// Fetch the catalog record for a product.
    async fn fetch_product(&self, id: ProductId) -> Result<Product, InventoryError>;
}

/// HTTP client for the inventory service.
///
/// Expects a JSON REST surface: `GET {base}/stock/{id}` returns a stock
/// record and `GET {base}/products/{id}` returns a product.
#[derive(Debug, Clone)]
pub struct HttpInventory {
    client: reqwest::Client,
    base: String,
}

impl HttpInventory {
    /// Create a client for the service at `base` (scheme and authority,
    /// e.g. `http://localhost:3333`).
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Execute a GET and decode the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        resource: &str,
        id: ProductId,
    ) -> Result<T, InventoryError> {
        let url = format!("{}/{resource}/{id}", self.base);
        debug!(%url, "inventory lookup");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(id));
        }
        if !status.is_success() {
            return Err(InventoryError::Status(status));
        }

        // Decode from text so a malformed body reports as a parse error with
        // the body available for diagnostics, not as a transport error.
        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "failed to parse inventory response"
                );
                Err(InventoryError::Parse(e))
            }
        }
    }
}

impl InventorySource for HttpInventory {
    async fn fetch_stock(&self, id: ProductId) -> Result<StockRecord, InventoryError> {
        self.get_json("stock", id).await
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, InventoryError> {
        self.get_json("products", id).await
    }
}
