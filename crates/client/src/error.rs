//! Unified error handling with Sentry integration.
//!
//! Every fallible operation in this crate returns its own error type; callers
//! that drive several components (the CLI, the [`Storefront`](crate::state::Storefront)
//! facade) collect them into [`ClientError`].

use thiserror::Error;

use crate::cart::CartError;
use crate::config::ConfigError;
use crate::http::ApiError;
use crate::services::auth::AuthError;
use crate::session::TokenError;
use crate::storage::StorageError;

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored token could not be decoded.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// A cart mutation was rejected or could not be saved.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A request to the backend failed. The message is already user-facing.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Login, registration or logout failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Invalid input from the caller.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ClientError {
    /// Whether this error points at a defect or an outage rather than bad
    /// input, and should be reported.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Token(_) => true,
            Self::Api(err) => err.is_server_side(),
            Self::Cart(CartError::Storage(_)) => true,
            Self::Auth(err) => err.is_reportable(),
            Self::Config(_) | Self::Cart(_) | Self::BadRequest(_) => false,
        }
    }

    /// Send the error to Sentry if it is reportable.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Client error"
            );
        }
    }
}

/// Set the Sentry user context.
///
/// Call this after a successful login to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
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
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
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
