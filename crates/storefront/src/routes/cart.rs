//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation answers with the re-rendered cart region, plus the count
//! badge and notice as out-of-band swaps.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use pocket_store_core::{CartStore, Notice, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Form data naming one product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub id: ProductId,
}

/// Quantity input form data. The raw text is kept so a bad value can be
/// clamped instead of rejected.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    pub id: ProductId,
    #[serde(default)]
    pub quantity: String,
}

/// Cart region plus out-of-band badge, notice, and dialog updates.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_update.html")]
pub struct CartUpdateTemplate {
    pub items_html: String,
    pub count: u64,
    pub message: String,
    pub close_dialog: bool,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Checkout confirmation dialog fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_dialog.html")]
pub struct CheckoutDialogTemplate {
    pub message: String,
}

/// Quantity typed into the cart's number input: at least 1, and 1 for
/// anything that is not a whole number.
#[must_use]
pub fn parse_quantity_input(raw: &str) -> i64 {
    raw.trim().parse::<i64>().map_or(1, |quantity| quantity.max(1))
}

/// What one request did to the cart.
struct CartChange {
    /// No checkout is pending any more.
    close_dialog: bool,
    /// Notice raised by this request, not an earlier one.
    notice: Option<Notice>,
}

/// Apply `f` to the cart under the lock and record what it changed.
fn apply<T>(state: &AppState, f: impl FnOnce(&mut CartStore) -> T) -> (T, CartChange) {
    let frame = state.frame();
    state.with_cart(|store| {
        let revision = frame.revision();
        let value = f(store);
        let change = CartChange {
            close_dialog: !store.phase().is_pending(),
            notice: frame.notice_since(revision),
        };
        (value, change)
    })
}

/// Build the response shared by every cart mutation.
fn cart_update(state: &AppState, change: &CartChange) -> Response {
    let frame = state.frame();
    (
        AppendHeaders([CART_UPDATED]),
        CartUpdateTemplate {
            items_html: frame.html(),
            count: frame.item_count(),
            message: change
                .notice
                .map(|notice| notice.message().to_string())
                .unwrap_or_default(),
            close_dialog: change.close_dialog,
        },
    )
        .into_response()
}

/// Apply `f` to the cart and answer with the refreshed region.
fn mutate(state: &AppState, f: impl FnOnce(&mut CartStore)) -> Response {
    let ((), change) = apply(state, f);
    cart_update(state, &change)
}

/// Cart region fragment.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Html<String> {
    Html(state.frame().html())
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> CartCountTemplate {
    CartCountTemplate {
        count: state.frame().item_count(),
    }
}

/// Add one unit of a catalog product.
///
/// The product is resolved before the cart is locked.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<ProductForm>) -> Result<Response> {
    let product = state.catalog().get_product(form.id).await?;
    let product_id = form.id.to_string();
    add_breadcrumb("cart", "Product added", Some(&[("product_id", product_id.as_str())]));
    Ok(mutate(&state, |store| store.add_item(&product)))
}

/// Set a line's quantity from the number input.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateQuantityForm>,
) -> Response {
    let quantity = parse_quantity_input(&form.quantity);
    mutate(&state, |store| store.set_quantity(form.id, quantity))
}

/// Increase a line by one.
#[instrument(skip(state))]
pub async fn increment(State(state): State<AppState>, Form(form): Form<ProductForm>) -> Response {
    mutate(&state, |store| store.increment(form.id))
}

/// Decrease a line by one, never below 1.
#[instrument(skip(state))]
pub async fn decrement(State(state): State<AppState>, Form(form): Form<ProductForm>) -> Response {
    mutate(&state, |store| store.decrement(form.id))
}

/// Remove a line. The page asks for confirmation before posting.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Form(form): Form<ProductForm>) -> Response {
    let product_id = form.id.to_string();
    add_breadcrumb(
        "cart",
        "Product removed",
        Some(&[("product_id", product_id.as_str())]),
    );
    mutate(&state, |store| {
        store.remove_item(form.id);
    })
}

/// Empty the cart. The page asks for confirmation before posting.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Response {
    add_breadcrumb("cart", "Cart cleared", None);
    mutate(&state, CartStore::clear)
}

/// Start checkout and show the confirmation dialog.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Result<CheckoutDialogTemplate> {
    let summary = state.with_cart(CartStore::checkout)?;
    Ok(CheckoutDialogTemplate {
        message: summary.confirmation_message(),
    })
}

/// Confirm the pending checkout: the order is placed and the cart emptied.
#[instrument(skip(state))]
pub async fn confirm_checkout(State(state): State<AppState>) -> Result<Response> {
    let (summary, change) = apply(&state, CartStore::confirm_checkout);
    let total = summary?.total.to_string();
    add_breadcrumb("cart", "Order placed", Some(&[("total", total.as_str())]));
    Ok(cart_update(&state, &change))
}

/// Dismiss the confirmation dialog without touching the cart.
#[instrument(skip(state))]
pub async fn cancel_checkout(State(state): State<AppState>) -> Html<&'static str> {
    state.with_cart(CartStore::cancel_checkout);
    Html("")
}
