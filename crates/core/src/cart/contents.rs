//! The ordered collection of line items.

use std::collections::HashSet;

use super::error::CartDataError;
use super::item::LineItem;
use crate::types::{Price, ProductId};

/// Ordered line items with unique product ids.
///
/// Insertion order is display order. Only [`CartStore`](super::CartStore) can
/// mutate a cart, which is how `quantity >= 1` and id uniqueness are upheld.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from previously persisted items.
    ///
    /// # Errors
    ///
    /// Returns [`CartDataError`] if any item has a zero quantity, an id
    /// appears twice, or the total cannot be represented.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, CartDataError> {
        let mut seen = HashSet::with_capacity(items.len());
        let mut total = Price::ZERO;
        for item in &items {
            if item.quantity == 0 {
                return Err(CartDataError::ZeroQuantity(item.id));
            }
            if !seen.insert(item.id) {
                return Err(CartDataError::DuplicateId(item.id));
            }
            total = item
                .unit_price
                .checked_times(item.quantity)
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(CartDataError::TotalOutOfRange)?;
        }
        Ok(Self { items })
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `unit_price * quantity` over all lines, saturating at
    /// [`Price::MAX`].
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub(crate) fn get_mut(&mut self, id: ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub(crate) fn push(&mut self, item: LineItem) {
        debug_assert!(!self.contains(item.id));
        self.items.push(item);
    }

    pub(crate) fn remove(&mut self, id: ProductId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
