//! Order commands.

use std::io::Write;

use shopapp_client::Storefront;
use shopapp_client::api::OrderQuery;
use shopapp_client::state::CheckoutDetails;
use shopapp_core::OrderId;

use crate::error::CliError;
use crate::output;

/// Check out the current cart.
pub async fn place(
    storefront: &Storefront,
    details: CheckoutDetails,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let order = storefront.checkout(details).await?;
    output::order(out, &order)?;
    Ok(())
}

pub async fn show(
    storefront: &Storefront,
    id: OrderId,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let order = storefront.api().get_order(id).await?;
    output::order(out, &order)?;
    Ok(())
}

pub async fn search(
    storefront: &Storefront,
    query: OrderQuery,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let orders = storefront.api().search_orders(&query).await?;
    output::orders(out, &orders)?;
    Ok(())
}
