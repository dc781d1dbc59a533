//! View state for storefront front ends.
//!
//! These types hold what a page needs to remember between user actions
//! (current catalog page, selected image, chosen quantity, open menu) without
//! rendering anything. A CLI, TUI or web front end drives them and renders
//! the result however it likes.
//!
//! - [`pagination`] - Visible page window and the product browser
//! - [`detail`] - Product detail page: image gallery and quantity selector
//! - [`header`] - Account menu in the page header

pub mod detail;
pub mod header;
pub mod pagination;

pub use detail::{ImageGallery, ProductDetail, QuantitySelector};
pub use header::{HeaderMenu, MenuAction};
pub use pagination::{ITEMS_PER_PAGE, MAX_VISIBLE_PAGES, ProductBrowser, visible_pages};
