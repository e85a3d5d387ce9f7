//! Sundial CLI - drive the shopping cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! sundial show
//!
//! # Add one unit of product 7
//! sundial add 7
//!
//! # Set the quantity of product 7 to 3
//! sundial update 7 3
//!
//! # Remove product 7 entirely
//! sundial remove 7
//! ```
//!
//! Configuration comes from the environment; see `sundial_cart::config` for
//! the variables. Every command prints the resulting cart.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};

use sundial_cart::{
    Cart, CartConfig, CartStore, FileStorage, HttpInventoryClient, TracingNotifier,
};
use sundial_core::{CurrencyCode, Price, ProductId};

#[derive(Parser)]
#[command(name = "sundial")]
#[command(version, about = "Sundial cart CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add one unit of a product to the cart
    Add {
        /// Product id
        product_id: ProductId,
    },
    /// Remove a product from the cart entirely
    Remove {
        /// Product id
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product id
        product_id: ProductId,
        /// Target quantity (absolute, not a delta)
        amount: i32,
    },
}

#[tokio::main]
async fn main() {
    // Default to info so cart notices reach the terminal
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sundial=info,sundial_cart=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;

    let store = CartStore::open(
        Arc::new(HttpInventoryClient::new(&config.inventory)),
        Arc::new(FileStorage::new(config.storage_dir.clone())),
        Arc::new(TracingNotifier),
    );

    match cli.command {
        Commands::Show => {}
        Commands::Add { product_id } => store.add_product(product_id).await,
        Commands::Remove { product_id } => store.remove_product(product_id).await,
        Commands::Update { product_id, amount } => {
            store.update_product_amount(product_id, amount).await;
        }
    }

    print_cart(&store.cart().await);
    Ok(())
}

/// Render the cart as one line per item plus a subtotal line.
#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    let currency = cart
        .items()
        .first()
        .map_or_else(CurrencyCode::default, |item| item.price.currency_code);

    for item in cart.items() {
        let line_total = Price::new(item.line_total(), item.price.currency_code).to_string();
        println!("{:>4} x {:<32} {line_total:>10}", item.amount, item.name);
    }

    println!(
        "{} item(s), subtotal {}",
        cart.item_count(),
        Price::new(cart.subtotal(), currency),
    );
}
