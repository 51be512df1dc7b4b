//! Mock login commands.

#![allow(clippy::print_stdout)]

use pocket_store_storefront::services::auth::AuthService;
use secrecy::SecretString;

use super::{CommandError, Context};

fn auth_service(ctx: &Context) -> AuthService {
    AuthService::new(&ctx.config.endpoints, ctx.storage.clone())
}

/// `login -e <EMAIL> -p <PASSWORD>`
///
/// # Errors
///
/// Returns `CommandError::Auth` for bad credentials or an unreachable
/// directory.
pub async fn login(ctx: &Context, email: &str, password: String) -> Result<(), CommandError> {
    let password = SecretString::from(password);
    let user = auth_service(ctx).login(email, &password).await?;
    println!("Hello {}", user.name);
    Ok(())
}

/// `logout`
///
/// # Errors
///
/// Returns `CommandError::Auth` if the stored user cannot be removed.
pub fn logout(ctx: &Context) -> Result<(), CommandError> {
    auth_service(ctx).logout()?;
    println!("Signed out.");
    Ok(())
}

/// `whoami`
pub fn whoami(ctx: &Context) {
    match auth_service(ctx).current_user() {
        Some(user) => println!("{} <{}>", user.name, user.username),
        None => println!("Not signed in."),
    }
}
