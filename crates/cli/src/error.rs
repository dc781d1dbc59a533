//! CLI error types.

use thiserror::Error;

use shopapp_client::ClientError;
use shopapp_client::api::ApiError;
use shopapp_client::cart::CartError;
use shopapp_client::config::ConfigError;
use shopapp_client::services::auth::AuthError;
use shopapp_client::storage::StorageError;

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Send the error to Sentry when it points at a client or backend fault.
    pub fn report(&self) {
        let reportable = match self {
            Self::Client(e) => e.is_reportable(),
            Self::Api(e) => e.is_server_side(),
            Self::Auth(e) => e.is_reportable(),
            Self::Storage(_) | Self::Cart(CartError::Storage(_)) => true,
            Self::Config(_) | Self::Cart(_) | Self::Output(_) | Self::InvalidArgument(_) => false,
        };
        if reportable {
            sentry::capture_error(self);
        }
    }
}
