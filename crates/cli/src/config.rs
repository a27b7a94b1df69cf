//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOEBOX_INVENTORY_URL` - Base URL of the inventory service
//!   (default: `http://localhost:3333`)
//! - `SHOEBOX_DATA_DIR` - Directory for persisted carts (default: `.shoebox`)
//! - `SHOEBOX_CART_KEY` - Storage key for this session's cart
//!   (default: `@shoebox:cart`)
//! - `RUST_LOG` - Tracing filter (default: `shoebox=info`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Base URL of the inventory service.
    pub inventory_url: Url,
    /// Directory holding persisted cart files.
    pub data_dir: PathBuf,
    /// Storage key for this session's cart.
    pub cart_key: String,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SHOEBOX_INVENTORY_URL` is set but not a
    /// valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let inventory_url = get_env_or_default("SHOEBOX_INVENTORY_URL", "http://localhost:3333")
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOEBOX_INVENTORY_URL".to_string(), e.to_string())
            })?;
        let data_dir = PathBuf::from(get_env_or_default("SHOEBOX_DATA_DIR", ".shoebox"));
        let cart_key = get_env_or_default("SHOEBOX_CART_KEY", "@shoebox:cart");

        Ok(Self {
            inventory_url,
            data_dir,
            cart_key,
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
