//! Mock authentication against the public demo user directory.
//!
//! There is no real secret here: the directory publishes its passwords. A
//! successful login only records who is "signed in" in the durable store so
//! the header can greet them across restarts.

mod error;

pub use error::AuthError;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use pocket_store_core::storage::USER_KEY;
use pocket_store_core::{KeyValueStore, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::EndpointsConfig;

/// A user record from the directory endpoint.
#[derive(Clone, Deserialize)]
pub struct DirectoryUser {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for DirectoryUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

/// The signed-in visitor, as persisted under the user key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoUser {
    pub username: String,
    pub name: String,
    pub token: String,
}

/// Mock login service.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthServiceInner>,
}

struct AuthServiceInner {
    client: reqwest::Client,
    endpoint: Url,
    storage: Arc<dyn KeyValueStore>,
    directory: Cache<(), Arc<Vec<DirectoryUser>>>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(config: &EndpointsConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        let directory = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(AuthServiceInner {
                client: reqwest::Client::new(),
                endpoint: config.users_url.clone(),
                storage,
                directory,
            }),
        }
    }

    /// Sign in with a directory email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` for blank input,
    /// `AuthError::InvalidCredentials` if nobody matches, and transport or
    /// storage errors otherwise.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<DemoUser, AuthError> {
        let email = email.trim();
        let password = password.expose_secret().trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let users = self.directory().await?;
        let user = users
            .iter()
            .find(|user| user.email == email && user.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let demo_user = DemoUser {
            username: user.email.clone(),
            name: user.name.clone(),
            token: mock_token(user.id, Utc::now()),
        };
        self.inner
            .storage
            .set(USER_KEY, &serde_json::to_string(&demo_user)?)?;

        info!(user_id = %user.id, "Demo user signed in");
        Ok(demo_user)
    }

    /// Forget the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored user cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.inner.storage.remove(USER_KEY)?;
        info!("Demo user signed out");
        Ok(())
    }

    /// The signed-in user, if any. Unreadable or corrupt records count as
    /// signed out.
    #[must_use]
    pub fn current_user(&self) -> Option<DemoUser> {
        let raw = match self.inner.storage.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Could not read stored user");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "Stored user is corrupt; treating as signed out"))
            .ok()
    }

    /// Seed the directory cache so no request is made until it expires.
    pub async fn prime_directory(&self, users: Vec<DirectoryUser>) {
        self.inner.directory.insert((), Arc::new(users)).await;
    }

    async fn directory(&self) -> Result<Arc<Vec<DirectoryUser>>, AuthError> {
        if let Some(users) = self.inner.directory.get(&()).await {
            debug!("Cache hit for user directory");
            return Ok(users);
        }

        let response = self
            .inner
            .client
            .get(self.inner.endpoint.as_str())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Status(status));
        }

        let body = response.text().await?;
        let users: Arc<Vec<DirectoryUser>> = Arc::new(serde_json::from_str(&body)?);
        self.inner.directory.insert((), Arc::clone(&users)).await;
        Ok(users)
    }
}

/// `token_{unix_millis}_{user_id}`
fn mock_token(user_id: UserId, now: DateTime<Utc>) -> String {
    format!("token_{}_{user_id}", now.timestamp_millis())
}
