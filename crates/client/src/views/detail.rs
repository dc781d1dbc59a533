//! Product detail page.

use tracing::debug;

use shopapp_core::Price;

use crate::api::Product;
use crate::cart::{CartError, CartStore};

/// Which of a product's images is on display.
///
/// The index always points at an existing image, or is 0 when there are
/// none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageGallery {
    images: Vec<String>,
    current: usize,
}

impl ImageGallery {
    #[must_use]
    pub const fn new(images: Vec<String>) -> Self {
        Self { images, current: 0 }
    }

    /// Show the image at `index`, clamped into range.
    ///
    /// Does nothing when there are no images.
    pub fn show(&mut self, index: i64) {
        let Some(last) = self.images.len().checked_sub(1) else {
            return;
        };
        self.current = usize::try_from(index.max(0)).unwrap_or(usize::MAX).min(last);
    }

    pub fn next(&mut self) {
        self.show(self.current_as_i64().saturating_add(1));
    }

    pub fn previous(&mut self) {
        self.show(self.current_as_i64().saturating_sub(1));
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.current
    }

    /// URL of the image on display.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.images.get(self.current).map(String::as_str)
    }

    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    fn current_as_i64(&self) -> i64 {
        i64::try_from(self.current).unwrap_or(i64::MAX)
    }
}

/// Quantity chosen before adding to the cart. Never below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantitySelector {
    quantity: u32,
}

impl Default for QuantitySelector {
    fn default() -> Self {
        Self { quantity: 1 }
    }
}

impl QuantitySelector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn get(&self) -> u32 {
        self.quantity
    }

    pub const fn increase(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub const fn decrease(&mut self) {
        if self.quantity > 1 {
            self.quantity -= 1;
        }
    }

    /// Price of the chosen quantity.
    #[must_use]
    pub fn total(&self, unit_price: Price) -> Price {
        unit_price.times(self.quantity)
    }
}

/// State of a product detail page.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    product: Product,
    gallery: ImageGallery,
    quantity: QuantitySelector,
    added_to_cart: bool,
}

impl ProductDetail {
    /// Open the page on the product's first image.
    ///
    /// Image URLs are expected to be resolved already, as the API client
    /// returns them.
    #[must_use]
    pub fn new(product: Product) -> Self {
        let images = product
            .product_images
            .iter()
            .map(|image| image.image_url.clone())
            .collect();
        Self {
            product,
            gallery: ImageGallery::new(images),
            quantity: QuantitySelector::new(),
            added_to_cart: false,
        }
    }

    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub const fn gallery(&self) -> &ImageGallery {
        &self.gallery
    }

    pub const fn gallery_mut(&mut self) -> &mut ImageGallery {
        &mut self.gallery
    }

    #[must_use]
    pub const fn quantity(&self) -> &QuantitySelector {
        &self.quantity
    }

    pub const fn quantity_mut(&mut self) -> &mut QuantitySelector {
        &mut self.quantity
    }

    /// Price of the chosen quantity.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.quantity.total(self.product.price)
    }

    #[must_use]
    pub const fn added_to_cart(&self) -> bool {
        self.added_to_cart
    }

    /// Add the chosen quantity to the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the cart rejects the line or cannot be saved.
    pub fn add_to_cart(&mut self, cart: &mut CartStore) -> Result<(), CartError> {
        let quantity = i32::try_from(self.quantity.get()).unwrap_or(i32::MAX);
        cart.add(self.product.id, quantity)?;
        self.added_to_cart = true;
        Ok(())
    }

    /// Add to the cart unless this page already did, ready for checkout.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the cart rejects the line or cannot be saved.
    pub fn buy_now(&mut self, cart: &mut CartStore) -> Result<(), CartError> {
        if self.added_to_cart {
            debug!(product_id = %self.product.id, "Already in cart, skipping add");
            return Ok(());
        }
        self.add_to_cart(cart)
    }
}
