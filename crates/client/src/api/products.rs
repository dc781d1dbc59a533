//! Product endpoints.
//!
//! Listing and detail responses have their image references resolved to
//! absolute URLs before they are cached or returned.

use reqwest::multipart::{Form, Part};
use tracing::instrument;

use shopapp_core::{ProductId, ProductImageId};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    Product, ProductDto, ProductListResponse, ProductPage, ProductQuery, UploadFile,
    UploadResponse,
};
use super::{ApiClient, ApiError};
use crate::http::map_error;

/// Path under which the backend serves product images.
const IMAGE_PATH: &str = "/products/images/";

impl ApiClient {
    /// Absolute URL of a product image.
    ///
    /// Values that are already absolute URLs are returned unchanged; bare
    /// file names resolve against the image endpoint.
    #[must_use]
    pub fn resolve_image_url(&self, image: &str) -> String {
        if image.starts_with("http://") || image.starts_with("https://") {
            return image.to_string();
        }
        format!(
            "{}{IMAGE_PATH}{}",
            self.base_url(),
            image.trim_start_matches('/')
        )
    }

    fn resolve_images(&self, mut product: Product) -> Product {
        product.url = product
            .thumbnail
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| self.resolve_image_url(name));
        for image in &mut product.product_images {
            image.image_url = self.resolve_image_url(&image.image_url);
        }
        product
    }

    /// `GET /products?keyword=&category_id=&page=&limit=`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is neither a list
    /// of products nor a paged product listing.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cache_key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(page)) = self.cached(&cache_key).await {
            return Ok(page);
        }

        let url = self.endpoint_with_query(
            "/products",
            &[
                ("keyword", query.keyword.clone()),
                (
                    "category_id",
                    query.category_id.map_or(0, |id| id.as_i32()).to_string(),
                ),
                ("page", query.page.to_string()),
                ("limit", query.limit.to_string()),
            ],
        )?;
        let response: ProductListResponse = self
            .execute(
                self.inner
                    .client
                    .get(url)
                    .headers(self.http().build_headers(true)),
            )
            .await?;

        let mut page = ProductPage::from(response);
        page.products = page
            .products
            .into_iter()
            .map(|p| self.resolve_images(p))
            .collect();

        self.cache(cache_key, CacheValue::Products(page.clone())).await;
        Ok(page)
    }

    /// `GET /products/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or another `ApiError` if
    /// the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&cache_key).await {
            return Ok(*product);
        }

        let url = self.endpoint(&format!("/products/{id}"))?;
        let product: Product = self
            .execute(
                self.inner
                    .client
                    .get(url)
                    .headers(self.http().build_headers(true)),
            )
            .await?;
        let product = self.resolve_images(product);

        self.cache(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// `GET /products/by-ids?ids=1,2,3`
    ///
    /// Used to render the cart. An empty id list returns an empty list
    /// without a request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn get_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let url = self.endpoint_with_query("/products/by-ids", &[("ids", joined)])?;
        let products: Vec<Product> = self
            .execute(
                self.inner
                    .client
                    .get(url)
                    .headers(self.http().build_headers(true)),
            )
            .await?;

        Ok(products
            .into_iter()
            .map(|p| self.resolve_images(p))
            .collect())
    }

    /// `POST /products`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn insert_product(&self, dto: &ProductDto) -> Result<Product, ApiError> {
        let url = self.endpoint("/products")?;
        let product: Product = self
            .execute(
                self.inner
                    .client
                    .post(url)
                    .headers(self.http().build_auth_headers(true))
                    .json(dto),
            )
            .await?;

        self.invalidate_products();
        Ok(self.resolve_images(product))
    }

    /// `PUT /products/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, dto), fields(product_id = %id))]
    pub async fn update_product(&self, id: ProductId, dto: &ProductDto) -> Result<Product, ApiError> {
        let url = self.endpoint(&format!("/products/{id}"))?;
        let product: Product = self
            .execute(
                self.inner
                    .client
                    .put(url)
                    .headers(self.http().build_auth_headers(true))
                    .json(dto),
            )
            .await?;

        self.invalidate_products();
        Ok(self.resolve_images(product))
    }

    /// `DELETE /products/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("/products/{id}"))?;
        let message = self
            .send(
                self.inner
                    .client
                    .delete(url)
                    .headers(self.http().build_auth_headers(true)),
            )
            .await?;

        self.invalidate_products();
        Ok(message)
    }

    /// `POST /products/uploads/{id}` as `multipart/form-data`, one `files`
    /// part per image.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if a part cannot be built or the request fails.
    #[instrument(skip(self, files), fields(product_id = %id, count = files.len()))]
    pub async fn upload_images(
        &self,
        id: ProductId,
        files: Vec<UploadFile>,
    ) -> Result<UploadResponse, ApiError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime_type)
                .map_err(map_error)?;
            form = form.part("files", part);
        }

        let url = self.endpoint(&format!("/products/uploads/{id}"))?;
        let body = self
            .send(
                self.inner
                    .client
                    .post(url)
                    .headers(self.http().build_file_upload_headers())
                    .multipart(form),
            )
            .await?;

        self.invalidate_products();

        // Some backend versions answer with a plain text confirmation
        Ok(serde_json::from_str(&body).unwrap_or(UploadResponse { message: body }))
    }

    /// `DELETE /product_images/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(image_id = %id))]
    pub async fn delete_product_image(&self, id: ProductImageId) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("/product_images/{id}"))?;
        let message = self
            .send(
                self.inner
                    .client
                    .delete(url)
                    .headers(self.http().build_auth_headers(true)),
            )
            .await?;

        self.invalidate_products();
        Ok(message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::api::ApiClient;
    use crate::config::ClientConfig;
    use crate::http::HttpUtil;
    use crate::session::TokenStore;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn client() -> ApiClient {
        let config = ClientConfig::for_base_url("http://localhost:8088/api/v1/").unwrap();
        let http = HttpUtil::new(TokenStore::new(Arc::new(MemoryStore::new())));
        ApiClient::new(&config, http)
    }

    #[test]
    fn test_resolve_image_url() {
        let api = client();
        assert_eq!(
            api.resolve_image_url("shoe.png"),
            "http://localhost:8088/api/v1/products/images/shoe.png"
        );
        assert_eq!(
            api.resolve_image_url("/shoe.png"),
            "http://localhost:8088/api/v1/products/images/shoe.png"
        );
        assert_eq!(
            api.resolve_image_url("https://cdn.example.com/shoe.png"),
            "https://cdn.example.com/shoe.png"
        );
    }
}
