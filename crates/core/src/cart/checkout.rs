//! Cart-level checkout phase.

use serde::Serialize;

use super::contents::Cart;
use crate::types::Price;

/// Snapshot shown to the visitor when checkout is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub item_count: u64,
    pub total: Price,
}

impl CheckoutSummary {
    #[must_use]
    pub fn of(cart: &Cart) -> Self {
        Self {
            item_count: cart.item_count(),
            total: cart.total(),
        }
    }

    /// Question asked before the order is placed.
    #[must_use]
    pub fn confirmation_message(&self) -> String {
        format!(
            "Confirm the purchase of {} products for a total of {}?",
            self.item_count, self.total
        )
    }
}

/// Where the cart is in the checkout flow.
///
/// `Shopping -> PendingConfirmation` on checkout; back to `Shopping` on
/// confirm (cart emptied), cancel (cart unchanged), or any effective
/// mutation of the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Shopping,
    PendingConfirmation(CheckoutSummary),
}

impl CheckoutPhase {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::PendingConfirmation(_))
    }
}
