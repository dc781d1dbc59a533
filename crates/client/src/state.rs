//! Client state shared across front-end actions.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, instrument};

use shopapp_core::{Price, ProductId};

use crate::api::{ApiClient, ApiError, Order, OrderDto, Product};
use crate::cart::{CartError, CartStore, SharedCart, lock_cart};
use crate::config::{ClientConfig, ConfigError};
use crate::error::{ClientError, add_breadcrumb};
use crate::http::HttpUtil;
use crate::models::SessionKey;
use crate::services::auth::{AuthError, AuthService};
use crate::session::{SessionKeyProvider, TokenStore, UserStore};
use crate::storage::{FileStore, SharedStore};
use crate::views::ProductBrowser;

/// Shipping and contact details entered at checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutDetails {
    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
    pub shipping_method: String,
    pub payment_method: String,
    pub coupon_code: Option<String>,
}

/// A cart line joined with its product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Everything the client keeps, wired around one store.
///
/// This struct is cheaply cloneable via `Arc`. The token store, user store,
/// cart and API client all share the same [`SharedStore`], so a login
/// through [`Storefront::auth`] is immediately visible to the cart and to
/// request headers.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    store: SharedStore,
    tokens: TokenStore,
    users: UserStore,
    cart: SharedCart,
    api: ApiClient,
    auth: AuthService,
}

impl Storefront {
    /// Build the client around an existing store.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the configured language cannot
    /// be sent as a header.
    pub fn new(config: ClientConfig, store: SharedStore) -> Result<Self, ConfigError> {
        let tokens = TokenStore::new(store.clone());
        let users = UserStore::new(store.clone());

        let http = HttpUtil::new(tokens.clone());
        http.set_default_language(&config.language).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPAPP_LANGUAGE".to_string(), e.to_string())
        })?;

        let api = ApiClient::new(&config, http);
        let cart: SharedCart = Arc::new(Mutex::new(CartStore::new(
            store.clone(),
            Arc::new(users.clone()),
        )));
        let auth = AuthService::new(api.clone(), tokens.clone(), users.clone(), cart.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                store,
                tokens,
                users,
                cart,
                api,
                auth,
            }),
        })
    }

    /// Build the client around the file store at `config.storage_path`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the file exists but cannot be read,
    /// or `ClientError::Config` if the configuration is unusable.
    pub fn open(config: ClientConfig) -> Result<Self, ClientError> {
        let store = FileStore::open(&config.storage_path)?;
        Ok(Self::new(config, Arc::new(store))?)
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the underlying key-value store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    #[must_use]
    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }

    /// Get a reference to the REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Session the cart is currently scoped to.
    #[must_use]
    pub fn session_key(&self) -> SessionKey {
        self.inner.users.session_key()
    }

    /// Exclusive access to the cart.
    ///
    /// Hold the guard only for synchronous work; do not keep it across an
    /// `.await`.
    #[must_use]
    pub fn cart(&self) -> MutexGuard<'_, CartStore> {
        lock_cart(&self.inner.cart)
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the input is rejected or the cart cannot be
    /// saved.
    pub fn add_to_cart(&self, product_id: ProductId, quantity: i32) -> Result<(), CartError> {
        self.cart().add(product_id, quantity)
    }

    /// Product listing positioned at the last viewed page.
    #[must_use]
    pub fn product_browser(&self) -> ProductBrowser {
        ProductBrowser::new(self.inner.store.clone())
    }

    /// Cart lines with their products, in cart order.
    ///
    /// Products the backend no longer returns are left out.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the products cannot be fetched.
    pub async fn cart_lines(&self) -> Result<Vec<CartLine>, ApiError> {
        let snapshot = self.cart().snapshot();
        let products = self.inner.api.get_products_by_ids(&snapshot.product_ids()).await?;

        Ok(snapshot
            .iter()
            .filter_map(|(id, quantity)| {
                products
                    .iter()
                    .find(|p| p.id == id)
                    .map(|product| CartLine {
                        product: product.clone(),
                        quantity,
                    })
            })
            .collect())
    }

    /// Place an order for everything in the cart and empty it.
    ///
    /// The order total is computed from current product prices.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::BadRequest` for an empty cart,
    /// `ClientError::Auth` when not logged in, `ClientError::Api` if the
    /// order is rejected, or `ClientError::Storage` if the cart cannot be
    /// cleared afterwards.
    #[instrument(skip(self, details))]
    pub async fn checkout(&self, details: CheckoutDetails) -> Result<Order, ClientError> {
        let snapshot = self.cart().snapshot();
        if snapshot.is_empty() {
            return Err(ClientError::BadRequest("cart is empty".to_string()));
        }

        let user_id = self.inner.tokens.user_id();
        if !user_id.is_valid() || self.inner.tokens.is_expired() {
            return Err(AuthError::NotLoggedIn.into());
        }

        let products = self.inner.api.get_products_by_ids(&snapshot.product_ids()).await?;
        let total_money = snapshot.subtotal(|id| {
            products.iter().find(|p| p.id == id).map(|p| p.price)
        });

        let dto = OrderDto {
            user_id,
            fullname: details.fullname,
            email: details.email,
            phone_number: details.phone_number,
            address: details.address,
            note: details.note,
            total_money,
            shipping_method: details.shipping_method,
            payment_method: details.payment_method,
            coupon_code: details.coupon_code,
            cart_items: snapshot.items(),
        };

        let order = self.inner.api.place_order(&dto).await?;
        self.cart().clear()?;

        let order_id = order.id.to_string();
        add_breadcrumb("order", "Placed order", Some(&[("order_id", order_id.as_str())]));
        info!(order_id = %order.id, total = %order.total_money, "Order placed");

        Ok(order)
    }
}
