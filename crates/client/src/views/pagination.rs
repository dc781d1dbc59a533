//! Catalog paging.

use tracing::{debug, warn};

use shopapp_core::CategoryId;

use crate::api::{ApiClient, ApiError, Category, Product, ProductPage, ProductQuery};
use crate::storage::{SharedStore, StorageError, keys};

/// Width of the page number window.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// Products shown per catalog page.
pub const ITEMS_PER_PAGE: u32 = 12;

/// Largest page index kept; the backend takes a signed 32-bit page.
pub const MAX_PAGE: u32 = 2_147_483_647;

/// Category page size used to fill the category filter.
const CATEGORY_LIMIT: u32 = 100;

/// Page numbers to show around `current`.
///
/// The window holds at most [`MAX_VISIBLE_PAGES`] consecutive numbers from
/// `1..=total`, starts two before `current` where possible and shifts left
/// near the end so it stays full. `current` is the zero-based page index the
/// API takes, while the numbers returned are one-based labels, so the window
/// is centred one label to the left of the current page.
#[must_use]
pub fn visible_pages(current: u32, total: u32) -> Vec<u32> {
    let half = MAX_VISIBLE_PAGES / 2;
    let current = current.min(total);
    let mut start = current.saturating_sub(half).max(1);
    let end = start.saturating_add(MAX_VISIBLE_PAGES - 1).min(total);

    if end.saturating_add(1) < start.saturating_add(MAX_VISIBLE_PAGES) {
        start = end.saturating_add(1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
    }

    (start..=end).collect()
}

/// State of the product listing page.
///
/// The current page survives restarts: it is read from and written to the
/// `currentProductPage` storage key.
pub struct ProductBrowser {
    store: SharedStore,
    keyword: String,
    category_id: Option<CategoryId>,
    page: u32,
    per_page: u32,
    total_pages: u32,
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl ProductBrowser {
    /// Create a browser positioned at the last persisted page.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        let page = read_persisted_page(&store);
        Self {
            store,
            keyword: String::new(),
            category_id: None,
            page,
            per_page: ITEMS_PER_PAGE,
            total_pages: 0,
            products: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Zero-based index of the current page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
    }

    /// Filter by category; `None` or an invalid id shows all categories.
    pub fn select_category(&mut self, category_id: Option<CategoryId>) {
        self.category_id = category_id.filter(CategoryId::is_valid);
    }

    /// Query for the current filter and page.
    #[must_use]
    pub fn query(&self) -> ProductQuery {
        ProductQuery {
            keyword: self.keyword.clone(),
            category_id: self.category_id,
            page: self.page,
            limit: self.per_page,
        }
    }

    /// Start a new search from the first page.
    ///
    /// Only the in-memory page is reset; the persisted page is left alone
    /// until the next explicit page change.
    pub fn search(&mut self) {
        self.page = 0;
    }

    /// Move to `page`, clamped into `0..=MAX_PAGE`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the page cannot be persisted.
    pub fn go_to_page(&mut self, page: i64) -> Result<(), StorageError> {
        let page = page.clamp(0, i64::from(MAX_PAGE));
        self.set_page(u32::try_from(page).unwrap_or(MAX_PAGE))
    }

    /// Page numbers to show for the current position.
    #[must_use]
    pub fn visible_pages(&self) -> Vec<u32> {
        visible_pages(self.page, self.total_pages)
    }

    /// Take in a fetched page of products.
    ///
    /// A listing without a page count is treated as a single page.
    pub fn apply(&mut self, page: ProductPage) {
        self.total_pages = page.total_pages.unwrap_or(1);
        self.products = page.products;
    }

    /// Fetch the products for the current query.
    ///
    /// On failure the listing is emptied and the error returned for display.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        match api.get_products(&self.query()).await {
            Ok(page) => {
                self.apply(page);
                debug!(
                    page = self.page,
                    total_pages = self.total_pages,
                    count = self.products.len(),
                    "Loaded product page"
                );
                Ok(())
            }
            Err(e) => {
                self.products.clear();
                self.total_pages = 0;
                Err(e)
            }
        }
    }

    /// Fetch the categories for the filter.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request; the category list is
    /// left empty.
    pub async fn load_categories(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        match api.get_categories(0, CATEGORY_LIMIT).await {
            Ok(categories) => {
                self.categories = categories;
                Ok(())
            }
            Err(e) => {
                self.categories.clear();
                Err(e)
            }
        }
    }

    fn set_page(&mut self, page: u32) -> Result<(), StorageError> {
        self.page = page;
        self.store
            .set(keys::CURRENT_PRODUCT_PAGE, &page.to_string())
    }
}

/// Last persisted page; anything unreadable or negative restarts at 0 and
/// anything past [`MAX_PAGE`] is clamped to it.
fn read_persisted_page(store: &SharedStore) -> u32 {
    match store.get(keys::CURRENT_PRODUCT_PAGE) {
        Ok(Some(raw)) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|page| u32::try_from(page).ok())
            .map_or(0, |page| page.min(MAX_PAGE)),
        Ok(None) => 0,
        Err(e) => {
            warn!(error = %e, "Failed to read current product page");
            0
        }
    }
}
