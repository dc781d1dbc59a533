//! User endpoints.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use shopapp_core::UserId;

use super::types::{LoginDto, LoginResponse, RegisterDto, UpdateUserDto};
use super::{ApiClient, ApiError};
use crate::models::UserProfile;

impl ApiClient {
    /// `POST /users/register`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend rejects the registration (for
    /// example a phone number that is already taken).
    #[instrument(skip(self, dto), fields(phone_number = %dto.phone_number))]
    pub async fn register(&self, dto: &RegisterDto) -> Result<UserProfile, ApiError> {
        let url = self.endpoint("/users/register")?;
        self.execute(
            self.inner
                .client
                .post(url)
                .headers(self.http().build_headers(true))
                .json(dto),
        )
        .await
    }

    /// `POST /users/login`
    ///
    /// Only exchanges credentials for a token; storing it is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the credentials are rejected or the request fails.
    #[instrument(skip(self, dto), fields(phone_number = %dto.phone_number))]
    pub async fn login(&self, dto: &LoginDto) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("/users/login")?;
        self.execute(
            self.inner
                .client
                .post(url)
                .headers(self.http().build_headers(true))
                .json(dto),
        )
        .await
    }

    /// `GET /users/details` with an explicit bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is rejected, or another
    /// `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn get_user_details(&self, token: &SecretString) -> Result<UserProfile, ApiError> {
        let url = self.endpoint("/users/details")?;
        self.execute(
            self.inner
                .client
                .get(url)
                .headers(self.http().build_headers_with_token(token.expose_secret())),
        )
        .await
    }

    /// `PUT /users/details/{id}` with an explicit bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the update is rejected or the request fails.
    #[instrument(skip(self, token, dto), fields(user_id = %id))]
    pub async fn update_user_details(
        &self,
        token: &SecretString,
        id: UserId,
        dto: &UpdateUserDto,
    ) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&format!("/users/details/{id}"))?;
        self.execute(
            self.inner
                .client
                .put(url)
                .headers(self.http().build_headers_with_token(token.expose_secret()))
                .json(dto),
        )
        .await
    }
}
