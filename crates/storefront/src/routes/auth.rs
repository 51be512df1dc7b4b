//! Mock login route handlers.
//!
//! Both handlers answer with a redirect to the home page, which reads the
//! signed-in user back from storage. A failed login carries its reason in the
//! `login` query parameter.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::routes::home::LoginProblem;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Handle login form submission.
#[instrument(skip(state, form))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let password = SecretString::from(form.password);
    match state.auth().login(&form.email, &password).await {
        Ok(user) => {
            set_sentry_user(&user.username);
            Redirect::to("/").into_response()
        }
        Err(e) => {
            if e.is_user_error() {
                warn!(error = %e, "Login rejected");
            } else {
                tracing::error!(error = %e, "Login failed");
            }
            let problem = LoginProblem::from(&e);
            Redirect::to(&format!("/?login={}", problem.as_query())).into_response()
        }
    }
}

/// Sign out and return to the home page.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<Redirect> {
    state.auth().logout()?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
