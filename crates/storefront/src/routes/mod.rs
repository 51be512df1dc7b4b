//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (catalog, cart, login state)
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart region fragment
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add one unit of a catalog product
//! POST /cart/update            - Set quantity from the number input
//! POST /cart/increment         - Quantity + 1
//! POST /cart/decrement         - Quantity - 1 (never below 1)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout
//! POST /checkout               - Confirmation dialog (400 on empty cart)
//! POST /checkout/confirm       - Place the order
//! POST /checkout/cancel        - Dismiss the dialog
//!
//! # Auth
//! POST /auth/login             - Mock login action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod home;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Directory holding the stylesheet.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::checkout))
        .route("/confirm", post(cart::confirm_checkout))
        .route("/cancel", post(cart::cancel_checkout))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
}

/// The full application: routes, health check, static files, and the
/// request middleware stack. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
