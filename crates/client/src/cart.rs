//! Per-session shopping cart.
//!
//! The cart is a mapping of product id to quantity, persisted under
//! `cart:<session key>` as a JSON list of `[product_id, quantity]` pairs.
//! Quantities are always at least one: setting a quantity to zero or below
//! removes the line instead.
//!
//! [`CartStore`] keeps the active cart in memory and writes it back after
//! every mutation. The storage key is asked from the [`SessionKeyProvider`]
//! each time, so after a login or logout callers only need [`CartStore::reload`]
//! to see the right cart.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use shopapp_core::{Price, ProductId};

use crate::error::add_breadcrumb;
use crate::session::SessionKeyProvider;
use crate::storage::{SharedStore, StorageError, read_json, write_json};

/// Errors returned by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product ids start at 1.
    #[error("invalid product id: {0}")]
    InvalidProductId(ProductId),

    /// Quantities added to the cart must be positive.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i32),

    /// The cart could not be persisted.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A line of the cart as sent to the orders endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Product id to quantity mapping.
///
/// Every stored quantity is positive and every id is valid; entries that
/// violate this are dropped when a cart is deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(ProductId, u32)>", into = "Vec<(ProductId, u32)>")]
pub struct Cart {
    lines: BTreeMap<ProductId, u32>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity of `product_id`, zero if absent.
    #[must_use]
    pub fn quantity(&self, product_id: ProductId) -> u32 {
        self.lines.get(&product_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lines.contains_key(&product_id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.values().map(|&q| u64::from(q)).sum()
    }

    /// Lines in ascending product id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.lines.iter().map(|(&id, &q)| (id, q))
    }

    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.keys().copied().collect()
    }

    /// Lines in the shape the orders endpoint expects.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.iter()
            .map(|(product_id, quantity)| CartItem {
                product_id,
                quantity,
            })
            .collect()
    }

    /// Total price of the cart given a price lookup.
    ///
    /// Products the lookup does not know are skipped.
    pub fn subtotal<F>(&self, mut price_of: F) -> Price
    where
        F: FnMut(ProductId) -> Option<Price>,
    {
        self.iter()
            .filter_map(|(id, quantity)| price_of(id).map(|price| price.times(quantity)))
            .sum()
    }

    fn insert(&mut self, product_id: ProductId, quantity: u32) {
        if product_id.is_valid() && quantity > 0 {
            self.lines.insert(product_id, quantity);
        }
    }
}

impl From<Vec<(ProductId, u32)>> for Cart {
    fn from(pairs: Vec<(ProductId, u32)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<Cart> for Vec<(ProductId, u32)> {
    fn from(cart: Cart) -> Self {
        cart.lines.into_iter().collect()
    }
}

impl FromIterator<(ProductId, u32)> for Cart {
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        let mut cart = Self::new();
        for (id, quantity) in iter {
            cart.insert(id, quantity);
        }
        cart
    }
}

/// Result of reading the cart back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartLoad {
    /// Nothing stored for this session; the cart is empty.
    Missing,
    /// A stored cart was read.
    Loaded { lines: usize },
    /// Stored data could not be read; the cart was reset to empty.
    Corrupt(String),
}

/// A cart store shared between the facade and the auth service.
pub type SharedCart = Arc<Mutex<CartStore>>;

/// Lock a shared cart, recovering the guard if a previous holder panicked.
pub fn lock_cart(cart: &Mutex<CartStore>) -> MutexGuard<'_, CartStore> {
    cart.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The active session's cart, backed by the key-value store.
pub struct CartStore {
    store: SharedStore,
    session: Arc<dyn SessionKeyProvider>,
    cart: Cart,
}

impl CartStore {
    /// Create the store and load the cart of the current session.
    #[must_use]
    pub fn new(store: SharedStore, session: Arc<dyn SessionKeyProvider>) -> Self {
        let mut cart_store = Self {
            store,
            session,
            cart: Cart::new(),
        };
        cart_store.reload();
        cart_store
    }

    /// Storage key of the current session's cart.
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.session.session_key().cart_key()
    }

    /// Re-read the cart for the current session.
    ///
    /// Absent or unreadable data leaves an empty cart; the outcome tells the
    /// two apart.
    pub fn reload(&mut self) -> CartLoad {
        let key = self.storage_key();

        match read_json::<Cart>(self.store.as_ref(), &key) {
            Ok(Some(cart)) => {
                let lines = cart.len();
                debug!(key = %key, lines, "Loaded cart");
                self.cart = cart;
                CartLoad::Loaded { lines }
            }
            Ok(None) => {
                self.cart = Cart::new();
                CartLoad::Missing
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to load cart, starting empty");
                self.cart = Cart::new();
                CartLoad::Corrupt(e.to_string())
            }
        }
    }

    /// Add `quantity` units of a product, creating the line if needed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidProductId` or `CartError::InvalidQuantity`
    /// (and leaves the cart untouched) for non-positive input, or
    /// `CartError::Storage` if the updated cart cannot be persisted.
    pub fn add(&mut self, product_id: ProductId, quantity: i32) -> Result<(), CartError> {
        if !product_id.is_valid() {
            warn!(product_id = %product_id, quantity, "Rejected add to cart: invalid product id");
            return Err(CartError::InvalidProductId(product_id));
        }
        let Some(added) = u32::try_from(quantity).ok().filter(|&q| q > 0) else {
            warn!(product_id = %product_id, quantity, "Rejected add to cart: invalid quantity");
            return Err(CartError::InvalidQuantity(quantity));
        };

        let current = self.cart.quantity(product_id);
        self.cart.insert(product_id, current.saturating_add(added));

        let (id, added) = (product_id.to_string(), added.to_string());
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", id.as_str()), ("quantity", added.as_str())]),
        );

        self.persist()?;
        Ok(())
    }

    /// Add a single unit of a product.
    ///
    /// # Errors
    ///
    /// See [`Self::add`].
    pub fn add_one(&mut self, product_id: ProductId) -> Result<(), CartError> {
        self.add(product_id, 1)
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or below removes the line. Returns `false` when the
    /// product is not in the cart (nothing is added).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, StorageError> {
        let Some(quantity) = u32::try_from(quantity).ok().filter(|&q| q > 0) else {
            return self.remove(product_id);
        };

        if !self.cart.contains(product_id) {
            return Ok(false);
        }

        self.cart.insert(product_id, quantity);
        self.persist()?;
        Ok(true)
    }

    /// Remove a line. Returns whether anything was removed.
    ///
    /// Storage is only written when a line was actually removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    pub fn remove(&mut self, product_id: ProductId) -> Result<bool, StorageError> {
        if self.cart.lines.remove(&product_id).is_none() {
            return Ok(false);
        }

        let id = product_id.to_string();
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id.as_str())]));

        self.persist()?;
        Ok(true)
    }

    /// Replace the whole cart; `None` empties it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the new cart cannot be persisted.
    pub fn replace_all(&mut self, cart: Option<Cart>) -> Result<(), StorageError> {
        self.cart = cart.unwrap_or_default();
        self.persist()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the empty cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart = Cart::new();
        self.persist()
    }

    /// The in-memory cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// A copy of the in-memory cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.cart.clone()
    }

    #[must_use]
    pub fn quantity(&self, product_id: ProductId) -> u32 {
        self.cart.quantity(product_id)
    }

    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_items()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let key = self.storage_key();
        write_json(self.store.as_ref(), &key, &self.cart).inspect_err(|e| {
            error!(key = %key, error = %e, "Failed to save cart");
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::RwLock;

    use rust_decimal::Decimal;
    use shopapp_core::UserId;

    use super::*;
    use crate::models::SessionKey;
    use crate::storage::{KeyValueStore, MemoryStore};

    /// Session provider whose key can be switched mid-test.
    #[derive(Default)]
    struct SwitchableSession(RwLock<Option<UserId>>);

    impl SwitchableSession {
        fn login(&self, id: i32) {
            *self.0.write().unwrap() = Some(UserId::new(id));
        }

        fn logout(&self) {
            *self.0.write().unwrap() = None;
        }
    }

    impl SessionKeyProvider for SwitchableSession {
        fn session_key(&self) -> SessionKey {
            self.0
                .read()
                .unwrap()
                .map_or(SessionKey::Guest, SessionKey::User)
        }
    }

    fn guest_cart() -> (Arc<MemoryStore>, CartStore) {
        let store = Arc::new(MemoryStore::new());
        let carts = CartStore::new(store.clone(), Arc::new(SessionKey::Guest));
        (store, carts)
    }

    fn pid(id: i32) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn test_add_accumulates_quantity() {
        let (_, mut carts) = guest_cart();
        carts.add(pid(5), 2).unwrap();
        carts.add(pid(5), 3).unwrap();

        assert_eq!(carts.quantity(pid(5)), 5);
        assert_eq!(carts.total_item_count(), 5);
        assert!(!carts.is_empty());

        assert!(carts.remove(pid(5)).unwrap());
        assert!(carts.is_empty());
    }

    #[test]
    fn test_add_one_defaults_to_single_unit() {
        let (_, mut carts) = guest_cart();
        carts.add_one(pid(3)).unwrap();
        carts.add_one(pid(3)).unwrap();
        assert_eq!(carts.quantity(pid(3)), 2);
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let (store, mut carts) = guest_cart();

        assert!(matches!(
            carts.add(pid(0), 1),
            Err(CartError::InvalidProductId(_))
        ));
        assert!(matches!(
            carts.add(pid(-2), 1),
            Err(CartError::InvalidProductId(_))
        ));
        assert!(matches!(
            carts.add(pid(1), 0),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(matches!(
            carts.add(pid(1), -4),
            Err(CartError::InvalidQuantity(-4))
        ));

        assert!(carts.is_empty());
        assert!(store.get("cart:guest").unwrap().is_none());
    }

    #[test]
    fn test_add_persists_pairs() {
        let (store, mut carts) = guest_cart();
        carts.add(pid(5), 2).unwrap();
        carts.add(pid(1), 1).unwrap();

        assert_eq!(
            store.get("cart:guest").unwrap().as_deref(),
            Some("[[1,1],[5,2]]")
        );
    }

    #[test]
    fn test_set_quantity() {
        let (_, mut carts) = guest_cart();
        carts.add(pid(2), 1).unwrap();

        assert!(carts.set_quantity(pid(2), 7).unwrap());
        assert_eq!(carts.quantity(pid(2)), 7);

        // Absent product is not added
        assert!(!carts.set_quantity(pid(9), 3).unwrap());
        assert!(!carts.cart().contains(pid(9)));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let (_, mut carts) = guest_cart();
        carts.add(pid(2), 4).unwrap();

        assert!(carts.set_quantity(pid(2), 0).unwrap());
        assert!(carts.is_empty());

        // Already gone: no-op returning false
        assert!(!carts.set_quantity(pid(2), 0).unwrap());
        assert!(!carts.set_quantity(pid(2), -1).unwrap());
    }

    #[test]
    fn test_remove_absent_does_not_write() {
        let (store, mut carts) = guest_cart();
        assert!(!carts.remove(pid(1)).unwrap());
        assert!(store.get("cart:guest").unwrap().is_none());
    }

    #[test]
    fn test_replace_all_none_equals_clear() {
        let (store, mut carts) = guest_cart();
        carts.add(pid(1), 1).unwrap();
        carts.replace_all(None).unwrap();
        let after_replace = store.get("cart:guest").unwrap();

        carts.add(pid(1), 1).unwrap();
        carts.clear().unwrap();
        let after_clear = store.get("cart:guest").unwrap();

        assert!(carts.is_empty());
        assert_eq!(after_replace, after_clear);
        assert_eq!(after_clear.as_deref(), Some("[]"));
    }

    #[test]
    fn test_replace_all_with_cart() {
        let (_, mut carts) = guest_cart();
        let replacement: Cart = [(pid(4), 2), (pid(8), 1)].into_iter().collect();
        carts.replace_all(Some(replacement.clone())).unwrap();
        assert_eq!(carts.snapshot(), replacement);
        assert_eq!(carts.total_item_count(), 3);
    }

    #[test]
    fn test_quantities_never_drop_to_zero() {
        let (_, mut carts) = guest_cart();
        let ops: [(&str, i32, i32); 12] = [
            ("add", 1, 3),
            ("set", 1, -1),
            ("add", 2, 1),
            ("set", 2, 0),
            ("add", 3, 2),
            ("set", 3, 5),
            ("remove", 3, 0),
            ("add", 4, -7),
            ("set", 5, 2),
            ("add", 0, 5),
            ("add", 6, 1),
            ("set", 6, 10),
        ];

        for (op, id, quantity) in ops {
            let _ = match op {
                "add" => carts.add(pid(id), quantity).map(|()| true).map_err(|_| ()),
                "set" => carts.set_quantity(pid(id), quantity).map_err(|_| ()),
                _ => carts.remove(pid(id)).map_err(|_| ()),
            };
            assert!(carts.cart().iter().all(|(id, q)| q > 0 && id.is_valid()));
        }

        assert_eq!(carts.snapshot().iter().collect::<Vec<_>>(), vec![(pid(6), 10)]);
    }

    #[test]
    fn test_reload_follows_session_key() {
        let store = Arc::new(MemoryStore::new());
        let session = Arc::new(SwitchableSession::default());
        let mut carts = CartStore::new(store.clone(), session.clone());

        carts.add(pid(1), 1).unwrap();

        session.login(7);
        assert_eq!(carts.reload(), CartLoad::Missing);
        assert!(carts.is_empty());

        carts.add(pid(2), 3).unwrap();
        assert_eq!(store.get("cart:7").unwrap().as_deref(), Some("[[2,3]]"));

        session.logout();
        assert_eq!(carts.reload(), CartLoad::Loaded { lines: 1 });
        assert_eq!(carts.quantity(pid(1)), 1);
        assert_eq!(carts.quantity(pid(2)), 0);

        session.login(7);
        carts.reload();
        assert_eq!(carts.quantity(pid(2)), 3);
    }

    #[test]
    fn test_storage_key_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let session = Arc::new(SwitchableSession::default());
        let mut carts = CartStore::new(store.clone(), session.clone());

        session.login(3);
        // Without a reload the in-memory cart is still the guest one, but it
        // is written under the new key.
        carts.add(pid(1), 1).unwrap();
        assert!(store.get("cart:guest").unwrap().is_none());
        assert!(store.get("cart:3").unwrap().is_some());
    }

    #[test]
    fn test_reload_corrupt_data_falls_back_to_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set("cart:guest", "{not json").unwrap();

        let mut carts = CartStore::new(store.clone(), Arc::new(SessionKey::Guest));
        assert!(carts.is_empty());
        assert!(matches!(carts.reload(), CartLoad::Corrupt(_)));
    }

    #[test]
    fn test_deserialize_drops_invalid_lines() {
        let cart: Cart = serde_json::from_str("[[1,2],[0,3],[4,0],[5,1]]").unwrap();
        assert_eq!(cart.product_ids(), vec![pid(1), pid(5)]);
    }

    #[test]
    fn test_items_and_subtotal() {
        let cart: Cart = [(pid(1), 2), (pid(2), 1), (pid(3), 1)].into_iter().collect();

        assert_eq!(
            cart.items(),
            vec![
                CartItem { product_id: pid(1), quantity: 2 },
                CartItem { product_id: pid(2), quantity: 1 },
                CartItem { product_id: pid(3), quantity: 1 },
            ]
        );

        let subtotal = cart.subtotal(|id| match id.as_i32() {
            1 => Some(Price::new(Decimal::new(1000, 2))),
            2 => Some(Price::new(Decimal::new(550, 2))),
            _ => None,
        });
        assert_eq!(subtotal.to_string(), "25.50");
    }
}
