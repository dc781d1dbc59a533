//! Cache types for catalog responses.

use shopapp_core::{CategoryId, ProductId};

use super::types::{Category, Product, ProductPage, ProductQuery};

/// Cache key for products and categories.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products(ProductQuery),
    Category(CategoryId),
    Categories { page: u32, limit: u32 },
}

impl CacheKey {
    /// Whether the entry holds product data.
    pub const fn is_product(&self) -> bool {
        matches!(self, Self::Product(_) | Self::Products(_))
    }

    /// Whether the entry holds category data.
    pub const fn is_category(&self) -> bool {
        matches!(self, Self::Category(_) | Self::Categories { .. })
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
    Category(Category),
    Categories(Vec<Category>),
}
