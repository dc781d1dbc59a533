//! Authentication service.
//!
//! Ties the user endpoints to local session state. After a successful login
//! the token and profile are stored and the cart is reloaded, so the user's
//! own cart replaces the guest one; logout reverses all three.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, LoginDto, RegisterDto, UpdateUserDto};
use crate::cart::{CartLoad, SharedCart, lock_cart};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::UserProfile;
use crate::session::{TokenStore, UserStore};

/// Minimum password length accepted by the backend.
const MIN_PASSWORD_LENGTH: usize = 3;

/// Authentication service.
///
/// Cheap to clone; clones share the same stores and cart.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    tokens: TokenStore,
    users: UserStore,
    cart: SharedCart,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        api: ApiClient,
        tokens: TokenStore,
        users: UserStore,
        cart: SharedCart,
    ) -> Self {
        Self {
            api,
            tokens,
            users,
            cart,
        }
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Log in and switch the session to the returned user.
    ///
    /// The token is stored first so the profile can be fetched with it. If
    /// the profile cannot be fetched the token is removed again, leaving the
    /// session as it was.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the backend rejects the credentials or the
    /// profile request, `AuthError::MissingToken` if no token came back, or
    /// `AuthError::Storage` if the session cannot be saved.
    #[instrument(skip(self, dto), fields(phone_number = %dto.phone_number))]
    pub async fn login(&self, dto: &LoginDto) -> Result<UserProfile, AuthError> {
        if dto.phone_number.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "phone number is required".to_string(),
            ));
        }

        let response = self.api.login(dto).await?;
        if response.token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        self.tokens.set(&response.token)?;
        let token = SecretString::from(response.token);

        let profile = match self.api.get_user_details(&token).await {
            Ok(profile) => profile,
            Err(e) => {
                if let Err(remove_err) = self.tokens.remove() {
                    warn!(error = %remove_err, "Failed to discard token after profile fetch failed");
                }
                return Err(e.into());
            }
        };

        self.users.save(&profile)?;
        let outcome = self.reload_cart();

        let user_id = profile.id.to_string();
        set_sentry_user(&user_id, Some(profile.phone_number.as_str()));
        add_breadcrumb("auth", "Logged in", Some(&[("user_id", user_id.as_str())]));
        info!(user_id = %profile.id, cart = ?outcome, "User logged in");

        Ok(profile)
    }

    /// Log out: forget the profile and token and fall back to the guest cart.
    ///
    /// Both entries are removed even if one removal fails.
    ///
    /// # Errors
    ///
    /// Returns the first `AuthError::Storage` encountered.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        let user_result = self.users.remove();
        let token_result = self.tokens.remove();

        self.reload_cart();
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);

        user_result?;
        token_result?;
        info!("User logged out");
        Ok(())
    }

    // =========================================================================
    // Registration / Profile
    // =========================================================================

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` or `AuthError::PasswordMismatch` for
    /// input rejected locally, or `AuthError::Api` if the backend rejects it.
    #[instrument(skip(self, dto), fields(phone_number = %dto.phone_number))]
    pub async fn register(&self, dto: &RegisterDto) -> Result<UserProfile, AuthError> {
        if dto.phone_number.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "phone number is required".to_string(),
            ));
        }
        if dto.fullname.trim().is_empty() {
            return Err(AuthError::InvalidInput("full name is required".to_string()));
        }
        validate_password(&dto.password, &dto.retype_password)?;

        let profile = self.api.register(dto).await?;
        info!(user_id = %profile.id, "User registered");
        Ok(profile)
    }

    /// Update the logged-in user's profile and store the result.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotLoggedIn` without a stored token and profile,
    /// `AuthError::PasswordMismatch` if a new password is not confirmed, or
    /// `AuthError::Api` if the backend rejects the update.
    #[instrument(skip(self, dto))]
    pub async fn update_profile(&self, dto: &UpdateUserDto) -> Result<UserProfile, AuthError> {
        let token = self.tokens.get();
        let Some(current) = self.users.current().filter(|_| !token.is_empty()) else {
            return Err(AuthError::NotLoggedIn);
        };

        match (&dto.password, &dto.retype_password) {
            (Some(password), Some(retype)) => validate_password(password, retype)?,
            (None, None) => {}
            _ => return Err(AuthError::PasswordMismatch),
        }

        let token = SecretString::from(token);
        let profile = self
            .api
            .update_user_details(&token, current.id, dto)
            .await?;

        self.users.save(&profile)?;
        Ok(profile)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// The stored profile, if one is stored and readable.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.users.current()
    }

    /// Whether a profile and an unexpired token are both stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        !self.tokens.get().is_empty() && !self.tokens.is_expired() && self.current_user().is_some()
    }

    fn reload_cart(&self) -> CartLoad {
        let outcome = lock_cart(&self.cart).reload();
        if let CartLoad::Corrupt(reason) = &outcome {
            warn!(reason = %reason, "Stored cart was unreadable and has been reset");
        }
        outcome
    }
}

/// Check that a password is long enough and matches its confirmation.
fn validate_password(password: &SecretString, retype: &SecretString) -> Result<(), AuthError> {
    let password = password.expose_secret();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password != retype.expose_secret() {
        return Err(AuthError::PasswordMismatch);
    }
    Ok(())
}
