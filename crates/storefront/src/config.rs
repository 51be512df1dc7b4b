//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DATA_DIR` - Directory for the durable cart/user store (default: .pocket-store)
//! - `CATALOG_PRODUCTS_URL` - Product catalog endpoint (default: fakestoreapi.com)
//! - `DIRECTORY_USERS_URL` - Demo user directory endpoint (default: api.escuelajs.co)
//! - `CATALOG_CACHE_TTL_SECS` - Cache lifetime for catalog and directory (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_PRODUCTS_URL: &str = "https://fakestoreapi.com/products";
const DEFAULT_USERS_URL: &str = "https://api.escuelajs.co/api/v1/users";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory backing the durable key-value store
    pub data_dir: PathBuf,
    /// Remote services
    pub endpoints: EndpointsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Remote REST services the storefront reads from.
#[derive(Debug, Clone)]
pub struct EndpointsConfig {
    /// Product catalog endpoint
    pub products_url: Url,
    /// User directory endpoint used by the mock login
    pub users_url: Url,
    /// How long fetched catalog and directory data is reused
    pub cache_ttl: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(lookup);

        let host = env.parsed("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed("STOREFRONT_PORT", "3000")?;
        let data_dir = PathBuf::from(env.or_default("STOREFRONT_DATA_DIR", ".pocket-store"));
        let endpoints = EndpointsConfig::from_lookup(&env)?;

        Ok(Self {
            host,
            port,
            data_dir,
            endpoints,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EndpointsConfig {
    fn from_lookup<F: Fn(&str) -> Option<String>>(env: &Lookup<F>) -> Result<Self, ConfigError> {
        let cache_ttl_secs: u64 = env.parsed("CATALOG_CACHE_TTL_SECS", "300")?;
        Ok(Self {
            products_url: env.url("CATALOG_PRODUCTS_URL", DEFAULT_PRODUCTS_URL)?,
            users_url: env.url("DIRECTORY_USERS_URL", DEFAULT_USERS_URL)?,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable parsed into `T`, falling back to `default`.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get an http(s) URL variable.
    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let url: Url = self.parsed(key, default)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }
}
