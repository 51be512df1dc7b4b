//! Pocket Store CLI - cart and login tools over the storefront's data directory.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! ps-cli cart show
//!
//! # Add product 3 from the catalog, then set its quantity
//! ps-cli cart add 3
//! ps-cli cart set 3 4
//!
//! # Place the order
//! ps-cli cart checkout --confirm
//!
//! # Mock login with the public demo account
//! ps-cli login -e john@mail.com -p changeme
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and change the saved cart
//! - `login` / `logout` / `whoami` - Mock login state

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use pocket_store_core::ProductId;

mod commands;

use commands::{CommandError, Context};

#[derive(Parser)]
#[command(name = "ps-cli")]
#[command(author, version, about = "Pocket Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and change the saved cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in with a demo directory account
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum CartAction {
    /// List the cart's lines and total
    Show,
    /// Add one unit of a catalog product
    Add {
        /// Catalog product id
        id: ProductId,
    },
    /// Remove a line
    Remove {
        /// Product id
        id: ProductId,

        /// Actually remove it
        #[arg(long)]
        yes: bool,
    },
    /// Set a line's quantity (0 or less removes it)
    Set {
        /// Product id
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Increase a line by one
    Inc {
        /// Product id
        id: ProductId,
    },
    /// Decrease a line by one, never below 1
    Dec {
        /// Product id
        id: ProductId,
    },
    /// Empty the cart
    Clear {
        /// Actually empty it
        #[arg(long)]
        yes: bool,
    },
    /// Summarize the cart for checkout
    Checkout {
        /// Place the order and empty the cart
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let ctx = Context::load()?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { id } => commands::cart::add(&ctx, id).await?,
            CartAction::Remove { id, yes } => commands::cart::remove(&ctx, id, yes),
            CartAction::Set { id, quantity } => commands::cart::set(&ctx, id, quantity),
            CartAction::Inc { id } => commands::cart::increment(&ctx, id),
            CartAction::Dec { id } => commands::cart::decrement(&ctx, id),
            CartAction::Clear { yes } => commands::cart::clear(&ctx, yes),
            CartAction::Checkout { confirm } => commands::cart::checkout(&ctx, confirm)?,
        },
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, &email, password).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx)?,
        Commands::Whoami => commands::auth::whoami(&ctx),
    }
    Ok(())
}
