//! Observer contract between the cart store and whatever presents it.

use std::fmt;
use std::time::Duration;

use super::contents::Cart;

/// Receives cart state after every effective mutation.
///
/// Observers cannot fail back into the store: anything that goes wrong while
/// rendering is the observer's to log or contain.
pub trait CartObserver: Send {
    /// Redraw from the current cart. Called after the state has been
    /// persisted, once per mutation.
    fn render(&mut self, cart: &Cart);

    /// Show a short-lived confirmation message. Advisory only.
    fn notify(&mut self, notice: &Notice) {
        let _ = notice;
    }
}

/// A human-readable confirmation of a completed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    ItemAdded,
    ItemRemoved,
    CartCleared,
    OrderPlaced,
}

impl Notice {
    /// How long a notice stays on screen.
    pub const DISPLAY_FOR: Duration = Duration::from_secs(2);

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ItemAdded => "Product added to cart",
            Self::ItemRemoved => "Product removed",
            Self::CartCleared => "Cart emptied",
            Self::OrderPlaced => "Purchase completed successfully!",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
