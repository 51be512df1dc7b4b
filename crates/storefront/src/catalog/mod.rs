//! Product catalog client.
//!
//! # Architecture
//!
//! - One REST endpoint returns the whole catalog as a JSON array
//! - The list is cached in memory via `moka` (TTL from configuration)
//! - Every product gets a pre-rendered display description before it is
//!   handed out, which is what cart lines capture on add
//!
//! # Example
//!
//! ```rust,ignore
//! use pocket_store_storefront::catalog::CatalogClient;
//!
//! let catalog = CatalogClient::new(&config.endpoints);
//! let product = catalog.get_product(ProductId::new(1)).await?;
//! store.add_item(&product);
//! ```

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use pocket_store_core::{ProductDescriptor, ProductId};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::EndpointsConfig;

use cache::CacheKey;

/// Characters of the catalog description kept in the display description.
const DESCRIPTION_EXCERPT_CHARS: usize = 100;

/// Errors that can occur when reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("Catalog returned status {0}")]
    Status(reqwest::StatusCode),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// No product with this id.
    #[error("Product not found: {0}")]
    NotFound(ProductId),
}

/// Client for the product catalog endpoint.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: Url,
    cache: Cache<CacheKey, Arc<Vec<ProductDescriptor>>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &EndpointsConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                endpoint: config.products_url.clone(),
                cache,
            }),
        }
    }

    /// All products, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the catalog cannot be fetched or parsed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<ProductDescriptor>>, CatalogError> {
        if let Some(products) = self.inner.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products = Arc::new(self.fetch_products().await?);
        self.inner
            .cache
            .insert(CacheKey::Products, Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the catalog has no such product.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<ProductDescriptor, CatalogError> {
        self.list_products()
            .await?
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    /// Seed the cache so no request is made until it expires.
    pub async fn prime(&self, products: Vec<ProductDescriptor>) {
        let products = products.into_iter().map(with_display_description).collect();
        self.inner
            .cache
            .insert(CacheKey::Products, Arc::new(products))
            .await;
    }

    async fn fetch_products(&self) -> Result<Vec<ProductDescriptor>, CatalogError> {
        debug!(endpoint = %self.inner.endpoint, "Fetching catalog");

        let response = self
            .inner
            .client
            .get(self.inner.endpoint.as_str())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        // Body as text first so parse errors carry serde's position info
        let body = response.text().await?;
        let products: Vec<ProductDescriptor> = serde_json::from_str(&body)?;
        debug!(count = products.len(), "Catalog fetched");

        Ok(products.into_iter().map(with_display_description).collect())
    }
}

/// `"Premium product: {category}. {first 100 chars}..."`
#[must_use]
pub fn display_description(product: &ProductDescriptor) -> String {
    let excerpt: String = product
        .description
        .chars()
        .take(DESCRIPTION_EXCERPT_CHARS)
        .collect();
    format!("Premium product: {}. {excerpt}...", product.category)
}

fn with_display_description(product: ProductDescriptor) -> ProductDescriptor {
    if product.display_description.is_some() {
        return product;
    }
    let description = display_description(&product);
    product.with_display_description(description)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pocket_store_core::Price;

    use super::*;

    fn endpoints() -> EndpointsConfig {
        EndpointsConfig {
            // Port 9 (discard) so an accidental fetch fails fast
            products_url: Url::parse("http://127.0.0.1:9/products").unwrap(),
            users_url: Url::parse("http://127.0.0.1:9/users").unwrap(),
            cache_ttl: Duration::from_secs(60),
        }
    }

    fn product(id: i32, category: &str, description: &str) -> ProductDescriptor {
        let mut product = ProductDescriptor::new(
            ProductId::new(id),
            format!("Product {id}"),
            Price::from_cents(100).unwrap(),
        );
        product.category = category.to_string();
        product.description = description.to_string();
        product
    }

    #[test]
    fn test_display_description_truncates_by_chars() {
        let long = "é".repeat(150);
        let text = display_description(&product(1, "jewelery", &long));

        assert!(text.starts_with("Premium product: jewelery. "));
        assert!(text.ends_with("..."));
        assert_eq!(text.chars().filter(|c| *c == 'é').count(), 100);
    }

    #[test]
    fn test_display_description_short_text() {
        let text = display_description(&product(1, "electronics", "Fast drive"));
        assert_eq!(text, "Premium product: electronics. Fast drive...");
    }

    #[tokio::test]
    async fn test_primed_catalog_serves_without_network() {
        let catalog = CatalogClient::new(&endpoints());
        catalog
            .prime(vec![product(1, "a", "first"), product(2, "b", "second")])
            .await;

        let products = catalog.list_products().await.unwrap();
        assert_eq!(products.len(), 2);

        let second = catalog.get_product(ProductId::new(2)).await.unwrap();
        assert_eq!(
            second.display_description.as_deref(),
            Some("Premium product: b. second...")
        );
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let catalog = CatalogClient::new(&endpoints());
        catalog.prime(vec![product(1, "a", "first")]).await;

        let err = catalog.get_product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(id) if id == ProductId::new(99)));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_http_error() {
        let catalog = CatalogClient::new(&endpoints());
        let err = catalog.list_products().await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
