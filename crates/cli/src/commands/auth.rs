//! Sign-in commands.

use teamall_client::api::Credentials;
use teamall_client::{ClientError, Storefront};
use teamall_core::Email;

use crate::output;

/// Sign in with email and password.
///
/// # Errors
///
/// Returns an error if the email is invalid or the backend refuses.
pub async fn login(
    shop: &Storefront,
    email: &str,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let location = shop.login(&Credentials::new(email, password)).await?;

    let user = shop.session().user_info();
    output::line(format_args!(
        "Signed in as {}",
        user.username.as_deref().unwrap_or("(unknown)")
    ));
    output::line(format_args!("Now at {}", location.full_path()));
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Returns an error if the login page cannot be entered.
pub async fn logout(shop: &Storefront) -> Result<(), ClientError> {
    let location = shop.logout().await?;
    output::line("Signed out");
    output::line(format_args!("Now at {}", location.full_path()));
    Ok(())
}

/// Check the stored session and print the profile.
///
/// # Errors
///
/// Returns an error if the profile cannot be printed as JSON.
pub async fn whoami(shop: &Storefront) -> Result<(), serde_json::Error> {
    if !shop.check_login_state().await {
        output::line("Not signed in");
        return Ok(());
    }

    let user = shop.session().user_info();
    output::line(serde_json::to_string_pretty(&user)?);
    if shop.session().is_admin() {
        output::line("Role: administrator");
    }
    Ok(())
}
