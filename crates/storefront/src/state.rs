//! Application state shared across handlers.

use std::sync::{Arc, Mutex, PoisonError};

use pocket_store_core::{CartStore, KeyValueStore, StorageError};

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::services::auth::AuthService;
use crate::storage::FileStore;
use crate::view::{CartFrame, CartViewBinder};

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("data directory unavailable: {0}")]
    Storage(#[from] StorageError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The storefront serves a single
/// local visitor, so there is exactly one cart store. Its lock is only ever
/// held synchronously, never across an `.await`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    auth: AuthService,
    cart: Mutex<CartStore>,
    frame: CartFrame,
}

impl AppState {
    /// Create the application state backed by files in the configured data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let storage = FileStore::open(&config.data_dir)?;
        Ok(Self::with_storage(config, Arc::new(storage)))
    }

    /// Create the application state over any key-value store.
    ///
    /// Restores the saved cart, binds the cart view, and renders it once so
    /// the first page load has markup to show.
    #[must_use]
    pub fn with_storage(config: StorefrontConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        let catalog = CatalogClient::new(&config.endpoints);
        let auth = AuthService::new(&config.endpoints, Arc::clone(&storage));

        let frame = CartFrame::default();
        let mut cart = CartStore::open(storage);
        cart.subscribe(Box::new(CartViewBinder::new(frame.clone())));
        cart.render();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                auth,
                cart: Mutex::new(cart),
                frame,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the mock authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// The latest rendering of the cart region.
    #[must_use]
    pub fn frame(&self) -> &CartFrame {
        &self.inner.frame
    }

    /// Run `f` with exclusive access to the cart store.
    ///
    /// A poisoned lock is recovered: mutations finish their in-memory change
    /// before observers run.
    pub fn with_cart<T>(&self, f: impl FnOnce(&mut CartStore) -> T) -> T {
        let mut store = self
            .inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }
}
