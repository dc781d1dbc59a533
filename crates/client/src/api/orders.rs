//! Order endpoints.
//!
//! All order calls carry the bearer token when one is stored.

use tracing::instrument;

use shopapp_core::OrderId;

use super::types::{Order, OrderDto, OrderQuery};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `POST /orders`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, dto), fields(user_id = %dto.user_id, lines = dto.cart_items.len()))]
    pub async fn place_order(&self, dto: &OrderDto) -> Result<Order, ApiError> {
        let url = self.endpoint("/orders")?;
        self.execute(
            self.inner
                .client
                .post(url)
                .headers(self.http().build_auth_headers(true))
                .json(dto),
        )
        .await
    }

    /// `GET /orders/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or another `ApiError` if
    /// the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("/orders/{id}"))?;
        self.execute(
            self.inner
                .client
                .get(url)
                .headers(self.http().build_auth_headers(true)),
        )
        .await
    }

    /// `GET /orders/get-orders-by-keyword?keyword=&page=&limit=`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn search_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint_with_query(
            "/orders/get-orders-by-keyword",
            &[
                ("keyword", query.keyword.clone()),
                ("page", query.page.to_string()),
                ("limit", query.limit.to_string()),
            ],
        )?;
        self.execute(
            self.inner
                .client
                .get(url)
                .headers(self.http().build_auth_headers(true)),
        )
        .await
    }

    /// `PUT /orders/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, dto), fields(order_id = %id))]
    pub async fn update_order(&self, id: OrderId, dto: &OrderDto) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("/orders/{id}"))?;
        self.execute(
            self.inner
                .client
                .put(url)
                .headers(self.http().build_auth_headers(true))
                .json(dto),
        )
        .await
    }

    /// `DELETE /orders/{id}`
    ///
    /// The backend answers with a plain text confirmation, returned as is.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: OrderId) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("/orders/{id}"))?;
        self.send(
            self.inner
                .client
                .delete(url)
                .headers(self.http().build_auth_headers(true)),
        )
        .await
    }
}
