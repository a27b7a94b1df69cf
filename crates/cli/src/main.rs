//! Shoebox CLI - drive a session cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Add one unit of product 1 to the cart
//! shoebox add 1
//!
//! # Set product 1 to five units
//! shoebox set 1 5
//!
//! # Remove product 1
//! shoebox remove 1
//!
//! # Show the cart
//! shoebox show
//!
//! # Empty the cart
//! shoebox clear
//! ```
//!
//! The cart is hydrated from the data directory before each command and
//! persisted after each successful mutation, so consecutive invocations act
//! on the same session cart. Warnings (out of stock, unknown product, service
//! unreachable) go to stderr; the command still exits zero in those cases,
//! matching the fire-and-forget notification contract.

#![cfg_attr(not(test), forbid(unsafe_code))]
// This binary's job is terminal output.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};

use shoebox_cart::{CartStore, HttpInventory, JsonFileStorage, NotificationSink};
use shoebox_core::ProductId;

mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "shoebox")]
#[command(author, version, about = "Shoebox cart CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product to the cart
    Add {
        /// Product identifier
        product_id: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product identifier
        product_id: i64,
    },
    /// Set a product's quantity (zero or negative is a no-op)
    Set {
        /// Product identifier
        product_id: i64,
        /// Target quantity
        quantity: i64,
    },
    /// Show the cart
    Show,
    /// Empty the cart
    Clear,
}

/// Sink that surfaces store warnings on stderr, toast-style.
#[derive(Debug, Clone, Copy, Default)]
struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn warn(&self, message: &str) {
        eprintln!("warning: {message}");
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; defaults to info for our crates
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shoebox=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::from_env()?;

    let inventory = HttpInventory::new(config.inventory_url.as_str());
    let storage = JsonFileStorage::new(&config.data_dir)?;
    let mut store = CartStore::hydrate(inventory, storage, ConsoleNotifier, config.cart_key);

    // Rejections and collaborator failures have already been surfaced through
    // the notifier; they are not process failures.
    match cli.command {
        Commands::Add { product_id } => {
            let _ = store.add_item(ProductId::new(product_id)).await;
        }
        Commands::Remove { product_id } => {
            let _ = store.remove_item(ProductId::new(product_id));
        }
        Commands::Set {
            product_id,
            quantity,
        } => {
            let _ = store
                .update_quantity(ProductId::new(product_id), quantity)
                .await;
        }
        Commands::Clear => {
            store.clear()?;
        }
        Commands::Show => {}
    }

    print_cart(store.cart());
    Ok(())
}

/// Print the cart as a small table, followed by the totals line.
fn print_cart(cart: &shoebox_core::Cart) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    println!("{:>6}  {:<30} {:>10} {:>5} {:>12}", "id", "title", "price", "qty", "total");
    for entry in cart.entries() {
        println!(
            "{:>6}  {:<30} {:>10} {:>5} {:>12}",
            entry.product_id(),
            entry.product.title,
            entry.product.price,
            entry.quantity,
            entry.line_total(),
        );
    }
    println!(
        "{} items, subtotal {}",
        cart.total_quantity(),
        cart.subtotal()
    );
}
