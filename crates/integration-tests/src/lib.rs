//! Integration tests for Pocket Store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocket-store-integration-tests
//! ```
//!
//! No network is needed: remote endpoints point at a closed local port and
//! the catalog and user directory caches are primed with the fixtures below.
//!
//! # Test Categories
//!
//! - `cart_sessions` - the file-backed cart across restarts
//! - `storefront_routes` - the router, driven in-process

#![allow(clippy::expect_used)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use pocket_store_core::{Price, ProductDescriptor, ProductId, UserId};
use pocket_store_storefront::config::StorefrontConfig;
use pocket_store_storefront::routes;
use pocket_store_storefront::services::auth::DirectoryUser;
use pocket_store_storefront::state::AppState;
use pocket_store_storefront::storage::FileStore;
use tempfile::TempDir;

/// A storefront over a temporary data directory with primed caches.
pub struct TestContext {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestContext {
    /// Start a storefront over a fresh, empty data directory.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = start(dir.path()).await;
        Self { dir, state }
    }

    /// Simulate a restart: a new state over the same data directory.
    pub async fn restart(&mut self) {
        self.state = start(self.dir.path()).await;
    }

    /// The router with the state attached.
    #[must_use]
    pub fn app(&self) -> Router {
        routes::app(self.state.clone())
    }

    /// A second handle on the data directory.
    #[must_use]
    pub fn storage(&self) -> FileStore {
        FileStore::open(self.dir.path()).expect("open data dir")
    }
}

async fn start(data_dir: &Path) -> AppState {
    let config = test_config(data_dir);
    let storage = FileStore::open(&config.data_dir).expect("open data dir");
    let state = AppState::with_storage(config, Arc::new(storage));
    state.catalog().prime(sample_products()).await;
    state.auth().prime_directory(sample_users()).await;
    state
}

/// Configuration with unreachable endpoints and the given data directory.
#[must_use]
pub fn test_config(data_dir: &Path) -> StorefrontConfig {
    let data_dir = data_dir.display().to_string();
    StorefrontConfig::from_lookup(|key| match key {
        "STOREFRONT_DATA_DIR" => Some(data_dir.clone()),
        "CATALOG_PRODUCTS_URL" => Some("http://127.0.0.1:9/products".to_string()),
        "DIRECTORY_USERS_URL" => Some("http://127.0.0.1:9/users".to_string()),
        _ => None,
    })
    .expect("valid test config")
}

fn price(cents: i64) -> Price {
    Price::from_cents(cents).expect("non-negative price")
}

/// Three catalog products, one with markup in its title.
#[must_use]
pub fn sample_products() -> Vec<ProductDescriptor> {
    vec![
        ProductDescriptor {
            image: "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg".to_string(),
            category: "men's clothing".to_string(),
            description: "Your perfect pack for everyday use and walks in the forest.".to_string(),
            ..ProductDescriptor::new(ProductId::new(1), "Fjallraven Backpack", price(10995))
        },
        ProductDescriptor {
            category: "men's clothing".to_string(),
            description: "Slim-fitting style, contrast raglan long sleeve.".to_string(),
            ..ProductDescriptor::new(ProductId::new(2), "Mens Casual T-Shirt", price(2230))
        },
        ProductDescriptor {
            category: "jewelery".to_string(),
            ..ProductDescriptor::new(ProductId::new(3), "<b>Bold</b> Bracelet", price(695))
        },
    ]
}

/// The public demo account.
#[must_use]
pub fn sample_users() -> Vec<DirectoryUser> {
    vec![DirectoryUser {
        id: UserId::new(1),
        email: "john@mail.com".to_string(),
        password: "changeme".to_string(),
        name: "Jhon".to_string(),
    }]
}
