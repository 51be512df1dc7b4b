//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! ps-cli cart show
//! ps-cli cart add 3
//! ps-cli cart set 3 0        # removes the line
//! ps-cli cart remove 3 --yes
//! ps-cli cart clear --yes
//! ps-cli cart checkout --confirm
//! ```
//!
//! Destructive commands without `--yes`/`--confirm` only describe what they
//! would do.

#![allow(clippy::print_stdout)]

use std::fmt::Write as _;

use pocket_store_core::{Cart, CartObserver, CartStore, Notice, ProductId};
use pocket_store_storefront::catalog::CatalogClient;

use super::{CommandError, Context};

/// Prints the cart after every mutation and the notice that follows it.
struct TerminalView;

impl CartObserver for TerminalView {
    fn render(&mut self, cart: &Cart) {
        print!("{}", format_cart(cart));
    }

    fn notify(&mut self, notice: &Notice) {
        println!("\n{notice}");
    }
}

fn open_store(ctx: &Context) -> CartStore {
    let mut store = CartStore::open(ctx.storage.clone());
    store.subscribe(Box::new(TerminalView));
    store
}

/// Cart as a plain-text table.
fn format_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:>4}  {:<40}  {:>3} x {:>9} = {:>10}",
            item.id.as_i32(),
            truncate(&item.title, 40),
            item.quantity,
            item.unit_price.to_string(),
            item.subtotal().to_string(),
        );
    }
    let _ = writeln!(
        out,
        "Total: {} ({} products)",
        cart.total(),
        cart.item_count()
    );
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn not_in_cart(id: ProductId) {
    println!("Product {id} is not in the cart.");
}

/// `cart show`
pub fn show(ctx: &Context) {
    open_store(ctx).render();
}

/// `cart add <ID>`
///
/// # Errors
///
/// Returns `CommandError::Catalog` if the product cannot be resolved.
pub async fn add(ctx: &Context, id: ProductId) -> Result<(), CommandError> {
    let catalog = CatalogClient::new(&ctx.config.endpoints);
    let product = catalog.get_product(id).await?;
    open_store(ctx).add_item(&product);
    Ok(())
}

/// `cart remove <ID> [--yes]`
pub fn remove(ctx: &Context, id: ProductId, yes: bool) {
    let mut store = open_store(ctx);
    let Some(title) = store.get(id).map(|item| item.title.clone()) else {
        not_in_cart(id);
        return;
    };

    if yes {
        store.remove_item(id);
    } else {
        println!(
            "Would remove \"{title}\" from the cart. Re-run with --yes to confirm."
        );
    }
}

/// `cart set <ID> <QTY>`
pub fn set(ctx: &Context, id: ProductId, quantity: i64) {
    let mut store = open_store(ctx);
    if store.get(id).is_none() {
        not_in_cart(id);
        return;
    }
    store.set_quantity(id, quantity);
}

/// `cart inc <ID>`
pub fn increment(ctx: &Context, id: ProductId) {
    let mut store = open_store(ctx);
    if store.get(id).is_none() {
        not_in_cart(id);
        return;
    }
    store.increment(id);
}

/// `cart dec <ID>`
pub fn decrement(ctx: &Context, id: ProductId) {
    let mut store = open_store(ctx);
    if store.get(id).is_none() {
        not_in_cart(id);
        return;
    }
    store.decrement(id);
}

/// `cart clear [--yes]`
pub fn clear(ctx: &Context, yes: bool) {
    let mut store = open_store(ctx);
    if store.is_empty() {
        println!("The cart is already empty.");
    } else if yes {
        store.clear();
    } else {
        println!(
            "Would empty the cart ({} products). Re-run with --yes to confirm.",
            store.item_count()
        );
    }
}

/// `cart checkout [--confirm]`
///
/// # Errors
///
/// Returns `CommandError::Cart` if the cart is empty.
pub fn checkout(ctx: &Context, confirm: bool) -> Result<(), CommandError> {
    let mut store = open_store(ctx);
    let summary = store.checkout()?;
    println!("{}", summary.confirmation_message());

    if confirm {
        store.confirm_checkout()?;
    } else {
        println!("Re-run with --confirm to place the order.");
    }
    Ok(())
}
