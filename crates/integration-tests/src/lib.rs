//! Integration tests for the Shopapp client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopapp-integration-tests
//! ```
//!
//! Every test starts its own [`StubBackend`]: an axum router on an ephemeral
//! local port that answers the REST endpoints the client calls and records
//! each request it receives. No external services are needed.
//!
//! ```rust,ignore
//! let backend = StubBackend::start(
//!     Router::new().route("/roles", get(|| async { Json(json!([])) })),
//! )
//! .await;
//! let storefront = backend.storefront();
//! storefront.api().get_roles().await?;
//! assert_eq!(backend.requests_to("/roles").len(), 1);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shopapp_client::config::ClientConfig;
use shopapp_client::storage::{MemoryStore, SharedStore};
use shopapp_client::Storefront;

/// Path prefix the stub serves the API under.
pub const API_PREFIX: &str = "/api/v1";

/// A request as the stub backend received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path below [`API_PREFIX`].
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// A header value as text, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// A local HTTP server standing in for the shop backend.
pub struct StubBackend {
    base_url: String,
    requests: RequestLog,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Serve `routes` under [`API_PREFIX`] on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(routes: Router) -> Self {
        let requests = RequestLog::default();
        let app = Router::new()
            .nest(API_PREFIX, routes)
            .layer(middleware::from_fn_with_state(requests.clone(), record));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener
            .local_addr()
            .expect("Failed to read stub backend address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}{API_PREFIX}"),
            requests,
            server,
        }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A client pointed at this backend, with fresh in-memory storage.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be configured.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        self.storefront_with_store(Arc::new(MemoryStore::new()))
    }

    /// A client pointed at this backend, sharing `store`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be configured.
    #[must_use]
    pub fn storefront_with_store(&self, store: SharedStore) -> Storefront {
        let config = ClientConfig::for_base_url(&self.base_url).expect("Invalid stub base URL");
        Storefront::new(config, store).expect("Failed to build storefront")
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path` (below [`API_PREFIX`]).
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let path = parts.uri.path();
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: parts.method.clone(),
            path: path.strip_prefix(API_PREFIX).unwrap_or(path).to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers.clone(),
            body: bytes.clone(),
        });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// =============================================================================
// Fixtures
// =============================================================================

/// An unsigned JWT carrying `userId` and `exp`.
#[must_use]
pub fn jwt(user_id: i32, expires_at: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "sub": format!("09000000{user_id:02}"),
            "userId": user_id,
            "exp": expires_at,
        })
        .to_string(),
    );
    format!("{header}.{payload}.signature")
}

/// An unsigned JWT carrying `userId` and no `exp`.
#[must_use]
pub fn jwt_without_exp(user_id: i32) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "userId": user_id }).to_string());
    format!("{header}.{payload}.signature")
}

/// A JWT for `user_id` valid for the next hour.
#[must_use]
pub fn fresh_jwt(user_id: i32) -> String {
    jwt(user_id, chrono::Utc::now().timestamp() + 3600)
}

/// Body of `GET /users/details` for `user_id`.
#[must_use]
pub fn profile_json(user_id: i32) -> Value {
    json!({
        "id": user_id,
        "fullname": format!("User {user_id}"),
        "phone_number": format!("09000000{user_id:02}"),
        "address": "Ha Noi",
        "is_active": true,
        "date_of_birth": "2000-01-01",
        "facebook_account_id": 0,
        "google_account_id": 0,
        "role": { "id": 1, "name": "user" }
    })
}

/// A catalog product with one image.
#[must_use]
pub fn product_json(id: i32, name: &str, price: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "thumbnail": format!("{id}.png"),
        "description": format!("About {name}"),
        "category_id": 1,
        "product_images": [
            { "id": id * 10, "image_url": format!("{id}-a.png") }
        ]
    })
}

/// An order as the orders endpoints return it.
#[must_use]
pub fn order_json(id: i32, user_id: i32, total: f64) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "fullname": format!("User {user_id}"),
        "phone_number": format!("09000000{user_id:02}"),
        "email": "user@example.com",
        "address": "Ha Noi",
        "note": "",
        "order_date": "2026-10-17",
        "status": "pending",
        "total_money": total,
        "shipping_method": "express",
        "payment_method": "cod",
        "order_details": []
    })
}
