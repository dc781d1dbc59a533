//! REST API client.
//!
//! One method per backend endpoint, grouped by resource:
//!
//! - [`categories`] - category listing and management
//! - [`products`] - catalog, product management and image uploads
//! - [`orders`] - order placement and lookup
//! - [`users`] - registration, login and profile
//! - [`roles`] - role listing
//!
//! Product and category reads are cached using `moka` (5-minute TTL by
//! default); every write to those resources invalidates the affected entries.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopapp_client::api::{ApiClient, ProductQuery};
//!
//! let api = ApiClient::new(&config, http);
//!
//! let page = api.get_products(&ProductQuery { limit: 12, ..Default::default() }).await?;
//! let product = api.get_product(page.products[0].id).await?;
//! ```

mod cache;
pub mod categories;
pub mod orders;
pub mod products;
pub mod roles;
pub mod types;
pub mod users;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

pub use crate::http::ApiError;
pub use types::*;

use crate::config::ClientConfig;
use crate::http::{HttpUtil, map_error};
use cache::{CacheKey, CacheValue};

/// Maximum number of cached catalog responses.
const CACHE_CAPACITY: u64 = 1000;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the shop REST API.
///
/// Cheap to clone; clones share the connection pool and the response cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    http: HttpUtil,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ClientConfig, http: HttpUtil) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .support_invalidation_closures()
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
                http,
                cache,
            }),
        }
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Header builder used for every request.
    #[must_use]
    pub fn http(&self) -> &HttpUtil {
        &self.inner.http
    }

    /// Absolute URL of an endpoint path such as `/products/7`.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}{path}", self.inner.base_url)).map_err(map_error)
    }

    /// Absolute URL of an endpoint with query parameters.
    fn endpoint_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    /// Send a request and read the whole body, mapping failures.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(map_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_error)?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(map_error(ApiError::from_status(status, &body)));
        }

        Ok(body)
    }

    /// Send a request and parse the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            debug!(
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            map_error(e)
        })
    }

    // =========================================================================
    // Cache
    // =========================================================================

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let value = self.inner.cache.get(key).await;
        if value.is_some() {
            debug!(key = ?key, "Cache hit");
        }
        value
    }

    async fn cache(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    /// Drop every cached product response.
    pub(crate) fn invalidate_products(&self) {
        self.invalidate_where(CacheKey::is_product);
    }

    /// Drop every cached category response.
    pub(crate) fn invalidate_categories(&self) {
        self.invalidate_where(CacheKey::is_category);
    }

    fn invalidate_where(&self, predicate: fn(&CacheKey) -> bool) {
        if let Err(e) = self
            .inner
            .cache
            .invalidate_entries_if(move |key, _| predicate(key))
        {
            warn!(error = %e, "Selective cache invalidation failed, clearing cache");
            self.inner.cache.invalidate_all();
        }
    }

    /// Drop all cached responses.
    pub fn clear_cache(&self) {
        self.inner.cache.invalidate_all();
    }
}
