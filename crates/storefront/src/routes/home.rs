//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use pocket_store_core::ProductDescriptor;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::services::auth::AuthError;
use crate::state::AppState;

/// Product card display data for the catalog grid.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

impl From<&ProductDescriptor> for ProductCardView {
    fn from(product: &ProductDescriptor) -> Self {
        Self {
            id: product.id.as_i32(),
            title: product.title.clone(),
            category: product.category.clone(),
            description: product.cart_description().to_string(),
            price: product.price.to_string(),
            image_url: product.image.clone(),
        }
    }
}

/// Query parameters set by the login redirect.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub login: Option<String>,
}

/// Outcome of a failed login, carried through the redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginProblem {
    Missing,
    Invalid,
    Unavailable,
}

impl LoginProblem {
    /// Query value used in the redirect back to the home page.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Invalid => "invalid",
            Self::Unavailable => "unavailable",
        }
    }

    fn from_query(value: &str) -> Option<Self> {
        match value {
            "missing" => Some(Self::Missing),
            "invalid" => Some(Self::Invalid),
            "unavailable" => Some(Self::Unavailable),
            _ => None,
        }
    }

    fn message(self) -> String {
        match self {
            Self::Missing => AuthError::MissingCredentials.to_string(),
            Self::Invalid => AuthError::InvalidCredentials.to_string(),
            Self::Unavailable => "Login is unavailable right now. Try again later.".to_string(),
        }
    }
}

impl From<&AuthError> for LoginProblem {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => Self::Missing,
            AuthError::InvalidCredentials => Self::Invalid,
            _ => Self::Unavailable,
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub user_name: String,
    pub login_error: String,
    pub products: Vec<ProductCardView>,
    pub catalog_error: bool,
    pub cart_html: String,
    pub count: u64,
    pub notice: String,
}

/// Display the home page: catalog, cart region, and login state.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> HomeTemplate {
    let (products, catalog_error) = match state.catalog().list_products().await {
        Ok(products) => (products.iter().map(ProductCardView::from).collect(), false),
        Err(e) => {
            warn!(error = %e, "Failed to load catalog");
            (Vec::new(), true)
        }
    };

    let frame = state.frame();
    HomeTemplate {
        user_name: state
            .auth()
            .current_user()
            .map(|user| user.name)
            .unwrap_or_default(),
        login_error: query
            .login
            .as_deref()
            .and_then(LoginProblem::from_query)
            .map(LoginProblem::message)
            .unwrap_or_default(),
        products,
        catalog_error,
        cart_html: frame.html(),
        count: frame.item_count(),
        notice: frame
            .active_notice()
            .map(|notice| notice.message().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_problem_round_trips_through_query() {
        for problem in [LoginProblem::Missing, LoginProblem::Invalid, LoginProblem::Unavailable] {
            assert_eq!(LoginProblem::from_query(problem.as_query()), Some(problem));
        }
        assert_eq!(LoginProblem::from_query("bogus"), None);
    }

    #[test]
    fn test_invalid_login_message_has_hint() {
        assert!(LoginProblem::Invalid.message().contains("john@mail.com / changeme"));
    }
}
