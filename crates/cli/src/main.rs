//! Clementine CLI - Database tools and the local shopping cart.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! clementine migrate
//!
//! # Seed a small demo catalog
//! clementine seed
//!
//! # Work with the local cart (persisted as JSON across invocations)
//! clementine cart add 3 --quantity 2
//! clementine cart list
//! clementine cart update 3 --quantity 1
//! clementine cart remove 3
//! clementine cart checkout --user-id 1 --first-name Ada --last-name Lovelace \
//!     --address "12 Analytical Row" --city London --zip-code EC1A
//! clementine cart clear
//! ```
//!
//! The cart mirrors the server's pricing formula for display; the server
//! recomputes pricing independently at checkout.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::cart::CartAction;

#[derive(Parser)]
#[command(name = "clementine")]
#[command(author, version, about = "Clementine Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with demo products
    Seed,
    /// Manage the local shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,

        /// Path of the cart file (defaults to `$CLEMENTINE_CART_FILE` or
        /// `.clementine-cart.json`)
        #[arg(long, global = true)]
        cart_file: Option<String>,

        /// Base URL of the API server
        #[arg(long, global = true, default_value = "http://localhost:5000")]
        api_url: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Cart {
            action,
            cart_file,
            api_url,
        } => commands::cart::run(action, cart_file, &api_url).await?,
    }

    Ok(())
}
