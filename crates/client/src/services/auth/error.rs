//! Authentication error types.

use thiserror::Error;

use crate::http::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input rejected before contacting the backend.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The login response did not contain a token.
    #[error("login response did not contain a token")]
    MissingToken,

    /// The operation needs a logged-in user.
    #[error("not logged in")]
    NotLoggedIn,

    /// The backend rejected the request or could not be reached.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Session state could not be saved or cleared.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Whether the failure should be reported to error tracking.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_side(),
            Self::Storage(_) | Self::MissingToken => true,
            Self::InvalidInput(_) | Self::PasswordMismatch | Self::NotLoggedIn => false,
        }
    }
}
