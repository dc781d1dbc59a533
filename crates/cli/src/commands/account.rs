//! Login, logout and registration commands.

use std::io::Write;

use secrecy::SecretString;
use tracing::info;

use shopapp_client::Storefront;
use shopapp_client::api::{LoginDto, RegisterDto, UpdateUserDto};
use shopapp_core::RoleId;

use crate::error::CliError;
use crate::output;

pub async fn login(
    storefront: &Storefront,
    phone_number: String,
    password: SecretString,
    role_id: RoleId,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let dto = LoginDto {
        phone_number,
        password,
        role_id,
    };
    let profile = storefront.auth().login(&dto).await?;
    info!(
        cart_items = storefront.cart().total_item_count(),
        "Switched to user cart"
    );
    output::profile(out, &profile)?;
    Ok(())
}

pub fn logout(storefront: &Storefront) -> Result<(), CliError> {
    storefront.auth().logout()?;
    Ok(())
}

/// Show the stored profile, or say nobody is logged in.
pub fn whoami(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    let auth = storefront.auth();
    match auth.current_user().filter(|_| auth.is_logged_in()) {
        Some(profile) => output::profile(out, &profile)?,
        None => writeln!(out, "Not logged in.")?,
    }
    Ok(())
}

pub async fn register(
    storefront: &Storefront,
    dto: RegisterDto,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let profile = storefront.auth().register(&dto).await?;
    info!(user_id = %profile.id, "Account created");
    output::profile(out, &profile)?;
    Ok(())
}

pub async fn update_profile(
    storefront: &Storefront,
    dto: UpdateUserDto,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let profile = storefront.auth().update_profile(&dto).await?;
    output::profile(out, &profile)?;
    Ok(())
}
