//! Command implementations.
//!
//! Every command opens the same data directory the storefront uses, so a cart
//! changed here shows up on the next page load and vice versa (the running
//! server only reads the file at startup).

pub mod auth;
pub mod cart;

use std::sync::Arc;

use pocket_store_core::{CartError, KeyValueStore, StorageError};
use pocket_store_storefront::catalog::CatalogError;
use pocket_store_storefront::config::{ConfigError, StorefrontConfig};
use pocket_store_storefront::services::auth::AuthError;
use pocket_store_storefront::storage::FileStore;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Cart(#[from] CartError),
}

/// Configuration and storage shared by every command.
pub struct Context {
    pub config: StorefrontConfig,
    pub storage: Arc<dyn KeyValueStore>,
}

impl Context {
    /// Load configuration from the environment and open the data directory.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if the configuration is invalid or the data
    /// directory cannot be created.
    pub fn load() -> Result<Self, CommandError> {
        let config = StorefrontConfig::from_env()?;
        let storage = FileStore::open(&config.data_dir)?;
        tracing::debug!(data_dir = %storage.dir().display(), "Data directory opened");
        Ok(Self {
            config,
            storage: Arc::new(storage),
        })
    }
}
