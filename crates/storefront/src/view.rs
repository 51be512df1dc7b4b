//! Cart view binder.
//!
//! [`CartViewBinder`] is the cart store's render observer. After every
//! mutation it redraws the whole cart region from the store's snapshot (no
//! diffing) into a shared [`CartFrame`], which request handlers read to build
//! their responses. Every control in the region posts the line's id back to a
//! cart route, so re-rendering also re-binds the controls.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use askama::Template;
use pocket_store_core::{Cart, CartObserver, LineItem, Notice};
use tracing::error;

/// Markup used if the cart template itself fails.
const RENDER_FALLBACK: &str =
    r#"<p class="cart-error">The cart could not be displayed. Reload the page.</p>"#;

/// Line item display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub unit_price: String,
    pub subtotal: String,
    pub quantity: u32,
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.as_i32(),
            title: item.title.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            unit_price: item.unit_price.to_string(),
            subtotal: item.subtotal().to_string(),
            quantity: item.quantity,
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}

/// The cart region (item list, totals, clear/checkout controls).
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Latest rendering of the cart region plus the active notice.
#[derive(Clone, Default)]
pub struct CartFrame {
    inner: Arc<RwLock<FrameState>>,
}

/// `notice` only ever holds a notice raised since the last render.
#[derive(Default)]
struct FrameState {
    html: String,
    item_count: u64,
    revision: u64,
    notice: Option<(Notice, Instant)>,
}

impl CartFrame {
    /// Markup of the cart region as of the last render.
    #[must_use]
    pub fn html(&self) -> String {
        self.read(|state| state.html.clone())
    }

    /// Item count as of the last render (for the header badge).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.read(|state| state.item_count)
    }

    /// The last notice, while it is inside its display window.
    #[must_use]
    pub fn active_notice(&self) -> Option<Notice> {
        self.read(|state| {
            state
                .notice
                .filter(|(_, shown_at)| shown_at.elapsed() < Notice::DISPLAY_FOR)
                .map(|(notice, _)| notice)
        })
    }

    /// Number of renders so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.read(|state| state.revision)
    }

    /// The notice raised by a change rendered after `revision`, if any.
    #[must_use]
    pub fn notice_since(&self, revision: u64) -> Option<Notice> {
        self.read(|state| {
            state
                .notice
                .filter(|_| state.revision > revision)
                .map(|(notice, _)| notice)
        })
    }

    fn read<T>(&self, f: impl FnOnce(&FrameState) -> T) -> T {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write(&self, f: impl FnOnce(&mut FrameState)) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

/// Render observer registered on the cart store.
pub struct CartViewBinder {
    frame: CartFrame,
}

impl CartViewBinder {
    #[must_use]
    pub const fn new(frame: CartFrame) -> Self {
        Self { frame }
    }
}

impl CartObserver for CartViewBinder {
    fn render(&mut self, cart: &Cart) {
        let template = CartItemsTemplate {
            cart: CartView::from(cart),
        };
        let html = template.render().unwrap_or_else(|e| {
            error!(error = %e, "Failed to render cart region");
            RENDER_FALLBACK.to_string()
        });
        let item_count = cart.item_count();

        self.frame.write(|state| {
            state.html = html;
            state.item_count = item_count;
            state.revision += 1;
            state.notice = None;
        });
    }

    fn notify(&mut self, notice: &Notice) {
        let notice = *notice;
        self.frame
            .write(|state| state.notice = Some((notice, Instant::now())));
    }
}
