//! Role endpoints.

use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::Role;

impl ApiClient {
    /// `GET /roles`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_roles(&self) -> Result<Vec<Role>, ApiError> {
        let url = self.endpoint("/roles")?;
        self.execute(
            self.inner
                .client
                .get(url)
                .headers(self.http().build_headers(true)),
        )
        .await
    }
}
