//! Catalog browsing commands.

use std::io::Write;

use shopapp_client::Storefront;
use shopapp_core::{CategoryId, ProductId};

use crate::error::CliError;
use crate::output;

/// Filter for `products list`.
#[derive(Debug, Default)]
pub struct ListOptions {
    pub keyword: Option<String>,
    pub category: Option<CategoryId>,
    pub page: Option<i64>,
}

/// List one page of products.
///
/// Without `--page` a new keyword or category restarts at the first page and
/// otherwise the last viewed page is shown again.
pub async fn list(
    storefront: &Storefront,
    options: ListOptions,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut browser = storefront.product_browser();
    let filtered = options.keyword.is_some() || options.category.is_some();

    if let Some(keyword) = options.keyword {
        browser.set_keyword(keyword);
    }
    browser.select_category(options.category);

    match options.page {
        Some(page) => browser.go_to_page(page)?,
        None if filtered => browser.search(),
        None => {}
    }

    browser.load(storefront.api()).await?;
    output::products(out, &browser)?;
    Ok(())
}

pub async fn show(
    storefront: &Storefront,
    id: ProductId,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let product = storefront.api().get_product(id).await?;
    output::product_detail(out, &product)?;
    Ok(())
}

pub async fn categories(
    storefront: &Storefront,
    page: u32,
    limit: u32,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let categories = storefront.api().get_categories(page, limit).await?;
    output::categories(out, &categories)?;
    Ok(())
}

pub async fn roles(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    let roles = storefront.api().get_roles().await?;
    output::roles(out, &roles)?;
    Ok(())
}
