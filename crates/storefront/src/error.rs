//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pocket_store_core::CartError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Product catalog could not be read.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Mock authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation was refused.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A fragment failed to render.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Http(_) | AuthError::Status(_) => StatusCode::BAD_GATEWAY,
                AuthError::Json(_) | AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Cart(err) => match err {
                CartError::EmptyCart => StatusCode::BAD_REQUEST,
                CartError::NoPendingCheckout => StatusCode::CONFLICT,
                CartError::Serialize(_) | CartError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the visitor. Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::NotFound(id)) => format!("Product {id} not found"),
            Self::Catalog(_) => "Error loading products. Try reloading the page.".to_string(),
            Self::Auth(err) if err.is_user_error() => err.to_string(),
            Self::Auth(_) => "Login is unavailable right now".to_string(),
            Self::Cart(err @ (CartError::EmptyCart | CartError::NoPendingCheckout)) => {
                err.to_string()
            }
            Self::Cart(_) | Self::Template(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in demo user.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Product added", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use pocket_store_core::ProductId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(CatalogError::NotFound(ProductId::new(4)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CatalogError::Status(StatusCode::SERVICE_UNAVAILABLE).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_cart_and_auth_status_codes() {
        assert_eq!(
            get_status(CartError::EmptyCart.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartError::NoPendingCheckout.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::MissingCredentials.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_public_message_hides_internals() {
        let err = AppError::Internal("disk path /var/secret".to_string());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::from(CartError::EmptyCart);
        assert_eq!(err.public_message(), "The cart is empty");
    }
}
