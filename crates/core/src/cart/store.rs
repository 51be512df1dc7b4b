//! The cart store: mutations, write-through persistence, and observers.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::checkout::{CheckoutPhase, CheckoutSummary};
use super::contents::Cart;
use super::error::CartError;
use super::item::{LineItem, ProductDescriptor};
use super::observer::{CartObserver, Notice};
use crate::storage::{CART_KEY, KeyValueStore};
use crate::types::{Price, ProductId};

/// Result of [`CartStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A saved cart was restored.
    Restored { lines: usize },
    /// Nothing was saved yet.
    Missing,
    /// The store could not be read; the previous state is kept.
    Unreadable,
    /// The saved data was malformed; the previous state is kept.
    Corrupt,
}

/// Owns one visitor's cart.
///
/// Every effective mutation runs in the same order: update memory, persist,
/// render observers, emit the notice (if any). A failed persist is logged and
/// never rolls back memory. Operations on an id that is not in the cart are
/// silent no-ops: nothing is persisted, rendered, or announced.
pub struct CartStore {
    cart: Cart,
    phase: CheckoutPhase,
    storage: Arc<dyn KeyValueStore>,
    observers: Vec<Box<dyn CartObserver>>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("phase", &self.phase)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty store without reading storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            cart: Cart::new(),
            phase: CheckoutPhase::Shopping,
            storage,
            observers: Vec::new(),
        }
    }

    /// Create a store and restore any saved cart.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self::new(storage);
        let outcome = store.load();
        debug!(?outcome, "Cart store opened");
        store
    }

    /// Register an observer. It is not rendered until the next mutation or
    /// an explicit [`render`](Self::render).
    pub fn subscribe(&mut self, observer: Box<dyn CartObserver>) {
        self.observers.push(observer);
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.cart.get(id)
    }

    #[must_use]
    pub const fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`, appending a new line if it is not yet in
    /// the cart.
    pub fn add_item(&mut self, product: &ProductDescriptor) {
        if let Some(item) = self.cart.get_mut(product.id) {
            item.quantity = item.quantity.saturating_add(1);
            debug!(product_id = %product.id, quantity = item.quantity, "Incremented existing line");
        } else {
            self.cart.push(LineItem::from_product(product));
            debug!(product_id = %product.id, "Added new line");
        }
        self.commit(Some(Notice::ItemAdded));
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        if self.cart.remove(id).is_none() {
            return false;
        }
        debug!(product_id = %id, "Removed line");
        self.commit(Some(Notice::ItemRemoved));
        true
    }

    /// Set the quantity of `id`. A quantity of zero or less removes the line.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) {
        if !self.cart.contains(id) {
            return;
        }
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        if let Some(item) = self.cart.get_mut(id) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            debug!(product_id = %id, quantity = item.quantity, "Set line quantity");
        }
        self.commit(None);
    }

    /// Add one unit to an existing line.
    pub fn increment(&mut self, id: ProductId) {
        let Some(item) = self.cart.get_mut(id) else {
            return;
        };
        item.quantity = item.quantity.saturating_add(1);
        self.commit(None);
    }

    /// Take one unit from an existing line. Never goes below 1; removing a
    /// line takes an explicit [`remove_item`](Self::remove_item).
    pub fn decrement(&mut self, id: ProductId) {
        let Some(item) = self.cart.get_mut(id) else {
            return;
        };
        if item.quantity <= 1 {
            return;
        }
        item.quantity -= 1;
        self.commit(None);
    }

    /// Empty the cart. Callers confirm with the visitor first.
    pub fn clear(&mut self) {
        if self.cart.is_empty() {
            return;
        }
        self.cart.clear();
        info!("Cart cleared");
        self.commit(Some(Notice::CartCleared));
    }

    // =========================================================================
    // Derived values
    // =========================================================================

    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Take a summary snapshot and wait for confirmation. Items are not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] if there is nothing to buy; the phase
    /// is left unchanged.
    pub fn checkout(&mut self) -> Result<CheckoutSummary, CartError> {
        if self.cart.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let summary = CheckoutSummary::of(&self.cart);
        self.phase = CheckoutPhase::PendingConfirmation(summary);
        debug!(item_count = summary.item_count, total = %summary.total, "Checkout pending");
        Ok(summary)
    }

    /// Place the pending order: empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NoPendingCheckout`] unless a checkout is pending.
    pub fn confirm_checkout(&mut self) -> Result<CheckoutSummary, CartError> {
        let CheckoutPhase::PendingConfirmation(summary) = std::mem::take(&mut self.phase) else {
            return Err(CartError::NoPendingCheckout);
        };
        self.cart.clear();
        info!(item_count = summary.item_count, total = %summary.total, "Order placed");
        self.commit(Some(Notice::OrderPlaced));
        Ok(summary)
    }

    /// Leave the pending checkout with the cart unchanged. Returns whether a
    /// checkout was pending.
    pub fn cancel_checkout(&mut self) -> bool {
        let was_pending = self.phase.is_pending();
        self.phase = CheckoutPhase::Shopping;
        was_pending
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the full item list to storage.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Serialize`] or [`CartError::Storage`].
    pub fn save(&self) -> Result<(), CartError> {
        let json = serde_json::to_string(self.cart.items())?;
        self.storage.set(CART_KEY, &json)?;
        Ok(())
    }

    /// Replace the in-memory cart with the saved one, if any.
    ///
    /// Missing, unreadable, or corrupt data leaves the current state alone.
    /// Failures are logged, never returned.
    pub fn load(&mut self) -> LoadOutcome {
        let raw = match self.storage.get(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Missing,
            Err(e) => {
                warn!(error = %e, "Could not read saved cart");
                return LoadOutcome::Unreadable;
            }
        };

        let items: Vec<LineItem> = match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Saved cart is not valid JSON; ignoring it");
                return LoadOutcome::Corrupt;
            }
        };

        match Cart::from_items(items) {
            Ok(cart) => {
                let lines = cart.len();
                self.cart = cart;
                self.phase = CheckoutPhase::Shopping;
                info!(lines, "Restored saved cart");
                LoadOutcome::Restored { lines }
            }
            Err(e) => {
                warn!(error = %e, "Saved cart violates cart invariants; ignoring it");
                LoadOutcome::Corrupt
            }
        }
    }

    /// Push the current cart to every observer.
    pub fn render(&mut self) {
        for observer in &mut self.observers {
            observer.render(&self.cart);
        }
    }

    /// Finish an effective mutation: leave any pending checkout, persist,
    /// render, announce.
    fn commit(&mut self, notice: Option<Notice>) {
        if self.phase.is_pending() {
            debug!("Cart changed during checkout confirmation; back to shopping");
            self.phase = CheckoutPhase::Shopping;
        }

        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist cart; keeping in-memory state");
        }

        self.render();

        if let Some(notice) = notice {
            for observer in &mut self.observers {
                observer.notify(&notice);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    /// Records what the store pushed to it.
    #[derive(Clone, Default)]
    struct Recorder {
        log: Arc<Mutex<RecorderLog>>,
    }

    #[derive(Default)]
    struct RecorderLog {
        renders: Vec<Vec<(ProductId, u32)>>,
        notices: Vec<Notice>,
    }

    impl Recorder {
        fn render_count(&self) -> usize {
            self.log.lock().unwrap().renders.len()
        }

        fn last_render(&self) -> Vec<(ProductId, u32)> {
            self.log.lock().unwrap().renders.last().cloned().unwrap_or_default()
        }

        fn notices(&self) -> Vec<Notice> {
            self.log.lock().unwrap().notices.clone()
        }
    }

    impl CartObserver for Recorder {
        fn render(&mut self, cart: &Cart) {
            let snapshot = cart.items().iter().map(|i| (i.id, i.quantity)).collect();
            self.log.lock().unwrap().renders.push(snapshot);
        }

        fn notify(&mut self, notice: &Notice) {
            self.log.lock().unwrap().notices.push(*notice);
        }
    }

    /// Store that fails every operation.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }
    }

    fn product(id: i32, cents: i64) -> ProductDescriptor {
        ProductDescriptor::new(
            ProductId::new(id),
            format!("Product {id}"),
            Price::from_cents(cents).unwrap(),
        )
    }

    fn store_with_recorder() -> (CartStore, Recorder, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let mut store = CartStore::new(storage.clone());
        let recorder = Recorder::default();
        store.subscribe(Box::new(recorder.clone()));
        (store, recorder, storage)
    }

    fn id(n: i32) -> ProductId {
        ProductId::new(n)
    }

    #[test]
    fn test_adding_same_product_twice_increments() {
        let (mut store, _, _) = store_with_recorder();
        store.add_item(&product(1, 1000));
        store.add_item(&product(1, 1000));

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.get(id(1)).unwrap().quantity, 2);
        assert_eq!(store.total(), Price::from_cents(2000).unwrap());
        assert_eq!(store.item_count(), 2);
    }

    #[test]
    fn test_price_is_captured_at_first_add() {
        let (mut store, _, _) = store_with_recorder();
        store.add_item(&product(1, 1000));
        store.add_item(&product(1, 9999));

        assert_eq!(store.get(id(1)).unwrap().unit_price, Price::from_cents(1000).unwrap());
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let (mut store, _, _) = store_with_recorder();
        for n in [3, 1, 2] {
            store.add_item(&product(n, 100));
        }
        store.add_item(&product(1, 100));

        let ids: Vec<i32> = store.items().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let (mut store, _, _) = store_with_recorder();
        store.add_item(&product(1, 100));
        store.set_quantity(id(1), 3);

        store.decrement(id(1));
        store.decrement(id(1));
        assert_eq!(store.get(id(1)).unwrap().quantity, 1);

        store.decrement(id(1));
        assert_eq!(store.get(id(1)).unwrap().quantity, 1);
    }

    #[test]
    fn test_decrement_at_floor_does_not_render() {
        let (mut store, recorder, _) = store_with_recorder();
        store.add_item(&product(1, 100));
        let before = recorder.render_count();

        store.decrement(id(1));
        assert_eq!(recorder.render_count(), before);
    }

    #[test]
    fn test_increment() {
        let (mut store, recorder, _) = store_with_recorder();
        store.add_item(&product(1, 100));
        store.increment(id(1));

        assert_eq!(store.get(id(1)).unwrap().quantity, 2);
        assert_eq!(recorder.last_render(), vec![(id(1), 2)]);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let (mut store, recorder, _) = store_with_recorder();
        store.add_item(&product(1, 100));
        store.set_quantity(id(1), 2);
        store.set_quantity(id(1), 0);

        assert!(store.get(id(1)).is_none());
        assert!(store.is_empty());
        assert_eq!(recorder.notices(), vec![Notice::ItemAdded, Notice::ItemRemoved]);
    }

    #[test]
    fn test_set_quantity_negative_removes() {
        let (mut store, _, _) = store_with_recorder();
        store.add_item(&product(1, 100));
        store.set_quantity(id(1), -4);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_quantity_saturates() {
        let (mut store, _, _) = store_with_recorder();
        store.add_item(&product(1, 1));
        store.set_quantity(id(1), i64::MAX);
        assert_eq!(store.get(id(1)).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_operations_on_absent_id_are_silent_noops() {
        let (mut store, recorder, storage) = store_with_recorder();

        assert!(!store.remove_item(id(9)));
        store.set_quantity(id(9), 5);
        store.set_quantity(id(9), 0);
        store.increment(id(9));
        store.decrement(id(9));

        assert!(store.is_empty());
        assert_eq!(recorder.render_count(), 0);
        assert!(recorder.notices().is_empty());
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut store, recorder, _) = store_with_recorder();
        store.add_item(&product(1, 100));
        store.add_item(&product(2, 100));

        assert!(store.remove_item(id(1)));
        let after_first = store.cart().clone();
        let renders = recorder.render_count();

        assert!(!store.remove_item(id(1)));
        assert_eq!(store.cart(), &after_first);
        assert_eq!(recorder.render_count(), renders);
    }

    #[test]
    fn test_every_mutation_persists_before_render() {
        let (mut store, recorder, storage) = store_with_recorder();
        store.add_item(&product(1, 250));
        store.increment(id(1));

        let saved: Vec<LineItem> =
            serde_json::from_str(&storage.get(CART_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved, store.items());
        assert_eq!(recorder.render_count(), 2);
    }

    #[test]
    fn test_clear() {
        let (mut store, recorder, storage) = store_with_recorder();
        store.add_item(&product(1, 100));
        store.add_item(&product(2, 100));
        store.clear();

        assert!(store.is_empty());
        assert_eq!(storage.get(CART_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(recorder.notices().last(), Some(&Notice::CartCleared));
    }

    #[test]
    fn test_clear_empty_cart_is_noop() {
        let (mut store, recorder, _) = store_with_recorder();
        store.clear();
        assert_eq!(recorder.render_count(), 0);
        assert!(recorder.notices().is_empty());
    }

    #[test]
    fn test_round_trip_across_sessions() {
        let storage = Arc::new(MemoryStore::new());
        let mut first = CartStore::new(storage.clone());
        first.add_item(&product(5, 1999));
        first.add_item(&product(2, 50));
        first.add_item(&product(5, 1999));

        let mut second = CartStore::new(storage);
        assert_eq!(second.load(), LoadOutcome::Restored { lines: 2 });
        assert_eq!(second.cart(), first.cart());
    }

    #[test]
    fn test_load_missing_keeps_empty_cart() {
        let mut store = CartStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.load(), LoadOutcome::Missing);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_keeps_prior_state() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = CartStore::new(storage.clone());
        store.add_item(&product(1, 100));

        storage.set(CART_KEY, "{not json").unwrap();
        assert_eq!(store.load(), LoadOutcome::Corrupt);
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_load_rejects_invariant_violations() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                CART_KEY,
                r#"[{"id":1,"title":"A","unitPrice":"1.00","quantity":0,"imageUrl":"","description":""}]"#,
            )
            .unwrap();

        let mut store = CartStore::new(storage.clone());
        assert_eq!(store.load(), LoadOutcome::Corrupt);
        assert!(store.is_empty());

        storage
            .set(
                CART_KEY,
                r#"[{"id":1,"title":"A","unitPrice":"-1.00","quantity":1,"imageUrl":"","description":""}]"#,
            )
            .unwrap();
        assert_eq!(store.load(), LoadOutcome::Corrupt);
    }

    #[test]
    fn test_load_rejects_total_out_of_range() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                CART_KEY,
                r#"[{"id":1,"title":"A","unitPrice":"79228162514264337593543950335","quantity":2,"imageUrl":"","description":""}]"#,
            )
            .unwrap();

        let mut store = CartStore::new(storage);
        assert_eq!(store.load(), LoadOutcome::Corrupt);
        assert!(store.is_empty());
        assert_eq!(store.total(), Price::ZERO);
    }

    #[test]
    fn test_huge_quantity_total_saturates() {
        let (mut store, recorder, _) = store_with_recorder();
        let price = "100000000000000000000".parse().unwrap();
        store.add_item(&ProductDescriptor::new(id(1), "Yacht", price));
        store.set_quantity(id(1), i64::MAX);

        assert_eq!(store.get(id(1)).unwrap().subtotal(), Price::MAX);
        assert_eq!(store.total(), Price::MAX);
        assert_eq!(recorder.render_count(), 2);
    }

    #[test]
    fn test_load_accepts_numeric_prices() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                CART_KEY,
                r#"[{"id":1,"title":"A","unitPrice":10.5,"quantity":2,"imageUrl":"","description":""}]"#,
            )
            .unwrap();

        let store = CartStore::open(storage);
        assert_eq!(store.total(), Price::from_cents(2100).unwrap());
    }

    #[test]
    fn test_broken_storage_is_not_fatal() {
        let mut store = CartStore::new(Arc::new(BrokenStore));
        assert_eq!(store.load(), LoadOutcome::Unreadable);

        store.add_item(&product(1, 100));
        store.increment(id(1));
        assert_eq!(store.get(id(1)).unwrap().quantity, 2);
        assert!(store.save().is_err());
    }

    #[test]
    fn test_checkout_on_empty_cart_fails_without_phase_change() {
        let (mut store, _, _) = store_with_recorder();
        assert!(matches!(store.checkout(), Err(CartError::EmptyCart)));
        assert_eq!(store.phase(), &CheckoutPhase::Shopping);
        assert!(store.is_empty());
    }

    #[test]
    fn test_checkout_then_confirm_empties_cart() {
        let (mut store, recorder, storage) = store_with_recorder();
        store.add_item(&product(1, 1000));
        store.add_item(&product(1, 1000));
        store.add_item(&product(2, 550));

        let summary = store.checkout().unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total, Price::from_cents(2550).unwrap());
        assert!(store.phase().is_pending());
        assert_eq!(store.item_count(), 3);

        let placed = store.confirm_checkout().unwrap();
        assert_eq!(placed, summary);
        assert!(store.is_empty());
        assert_eq!(store.phase(), &CheckoutPhase::Shopping);
        assert_eq!(storage.get(CART_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(recorder.notices().last(), Some(&Notice::OrderPlaced));
    }

    #[test]
    fn test_cancel_checkout_keeps_items() {
        let (mut store, _, _) = store_with_recorder();
        store.add_item(&product(1, 1000));
        store.checkout().unwrap();

        assert!(store.cancel_checkout());
        assert_eq!(store.item_count(), 1);
        assert!(!store.cancel_checkout());
        assert!(matches!(
            store.confirm_checkout(),
            Err(CartError::NoPendingCheckout)
        ));
    }

    #[test]
    fn test_mutation_during_confirmation_returns_to_shopping() {
        let (mut store, _, _) = store_with_recorder();
        store.add_item(&product(1, 1000));
        store.checkout().unwrap();

        store.add_item(&product(2, 100));
        assert_eq!(store.phase(), &CheckoutPhase::Shopping);
        assert!(matches!(
            store.confirm_checkout(),
            Err(CartError::NoPendingCheckout)
        ));
        assert_eq!(store.item_count(), 2);
    }

    #[test]
    fn test_noop_during_confirmation_keeps_pending() {
        let (mut store, _, _) = store_with_recorder();
        store.add_item(&product(1, 1000));
        store.checkout().unwrap();

        store.decrement(id(1));
        store.remove_item(id(42));
        assert!(store.phase().is_pending());
    }
}
