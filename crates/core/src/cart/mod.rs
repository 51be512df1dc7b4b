//! Cart state manager.
//!
//! # Architecture
//!
//! - [`Cart`] is the ordered list of [`LineItem`]s, keyed by product id.
//! - [`CartStore`] owns a `Cart`, applies every mutation, writes the result
//!   through to a [`KeyValueStore`](crate::storage::KeyValueStore), and then
//!   pushes the new state to registered [`CartObserver`]s.
//! - Checkout is a two-step phase machine ([`CheckoutPhase`]): `checkout`
//!   takes a summary snapshot, `confirm_checkout` empties the cart.
//!
//! Total and item count are always derived from the current items; nothing
//! derived is stored or persisted.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pocket_store_core::{CartStore, MemoryStore, Price, ProductDescriptor, ProductId};
//!
//! let mut store = CartStore::new(Arc::new(MemoryStore::new()));
//! let mug = ProductDescriptor::new(ProductId::new(1), "Mug", Price::from_cents(1000).unwrap());
//!
//! store.add_item(&mug);
//! store.add_item(&mug);
//!
//! assert_eq!(store.item_count(), 2);
//! assert_eq!(store.total(), Price::from_cents(2000).unwrap());
//! ```

mod checkout;
mod contents;
mod error;
mod item;
mod observer;
mod store;

pub use checkout::{CheckoutPhase, CheckoutSummary};
pub use contents::Cart;
pub use error::{CartDataError, CartError};
pub use item::{LineItem, ProductDescriptor};
pub use observer::{CartObserver, Notice};
pub use store::{CartStore, LoadOutcome};
