//! Authentication error types.

use pocket_store_core::StorageError;
use thiserror::Error;

/// Errors that can occur during mock authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password left blank.
    #[error("Enter email and password.")]
    MissingCredentials,

    /// No directory user matches the email/password pair.
    #[error("Invalid credentials. Use: john@mail.com / changeme")]
    InvalidCredentials,

    /// The user directory could not be reached.
    #[error("user directory HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The user directory answered with a non-success status.
    #[error("user directory returned status {0}")]
    Status(reqwest::StatusCode),

    /// The directory or stored user could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The logged-in user could not be stored or removed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Whether the visitor can fix this by changing their input.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::MissingCredentials | Self::InvalidCredentials)
    }
}
