//! Pocket Store Core - cart state manager and shared types.
//!
//! This crate is used by every Pocket Store component:
//! - `storefront` - Local single-visitor web storefront
//! - `cli` - Command-line access to the same cart
//!
//! # Architecture
//!
//! The core crate performs no network or filesystem I/O. Durable storage is
//! reached through the [`storage::KeyValueStore`] trait and presentation
//! through the [`cart::CartObserver`] trait, so the cart can be driven and
//! tested without any UI.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices
//! - [`cart`] - Cart line items, the cart store, and the checkout phase machine
//! - [`storage`] - Key-value persistence trait and an in-memory implementation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod storage;
pub mod types;

pub use cart::{
    Cart, CartDataError, CartError, CartObserver, CartStore, CheckoutPhase, CheckoutSummary,
    LineItem, LoadOutcome, Notice, ProductDescriptor,
};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use types::*;
