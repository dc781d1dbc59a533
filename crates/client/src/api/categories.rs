//! Category endpoints.

use tracing::instrument;

use shopapp_core::CategoryId;

use super::cache::{CacheKey, CacheValue};
use super::types::{Category, CategoryDto};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /categories?page=&limit=`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not a list of
    /// categories.
    #[instrument(skip(self))]
    pub async fn get_categories(&self, page: u32, limit: u32) -> Result<Vec<Category>, ApiError> {
        let cache_key = CacheKey::Categories { page, limit };
        if let Some(CacheValue::Categories(categories)) = self.cached(&cache_key).await {
            return Ok(categories);
        }

        let url = self.endpoint_with_query(
            "/categories",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )?;
        let categories: Vec<Category> = self
            .execute(
                self.inner
                    .client
                    .get(url)
                    .headers(self.http().build_headers(true)),
            )
            .await?;

        self.cache(cache_key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// `GET /categories/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or another `ApiError` if
    /// the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ApiError> {
        let cache_key = CacheKey::Category(id);
        if let Some(CacheValue::Category(category)) = self.cached(&cache_key).await {
            return Ok(category);
        }

        let url = self.endpoint(&format!("/categories/{id}"))?;
        let category: Category = self
            .execute(
                self.inner
                    .client
                    .get(url)
                    .headers(self.http().build_headers(true)),
            )
            .await?;

        self.cache(cache_key, CacheValue::Category(category.clone()))
            .await;
        Ok(category)
    }

    /// `POST /categories`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn insert_category(&self, dto: &CategoryDto) -> Result<Category, ApiError> {
        let url = self.endpoint("/categories")?;
        let category = self
            .execute(
                self.inner
                    .client
                    .post(url)
                    .headers(self.http().build_auth_headers(true))
                    .json(dto),
            )
            .await?;

        self.invalidate_categories();
        Ok(category)
    }

    /// `PUT /categories/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, dto), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        dto: &CategoryDto,
    ) -> Result<Category, ApiError> {
        let url = self.endpoint(&format!("/categories/{id}"))?;
        let category = self
            .execute(
                self.inner
                    .client
                    .put(url)
                    .headers(self.http().build_auth_headers(true))
                    .json(dto),
            )
            .await?;

        self.invalidate_categories();
        Ok(category)
    }

    /// `DELETE /categories/{id}`
    ///
    /// Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("/categories/{id}"))?;
        let message = self
            .send(
                self.inner
                    .client
                    .delete(url)
                    .headers(self.http().build_auth_headers(true)),
            )
            .await?;

        self.invalidate_categories();
        Ok(message)
    }
}
