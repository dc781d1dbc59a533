//! Cart commands.

use std::io::Write;

use tracing::info;

use shopapp_client::Storefront;
use shopapp_core::ProductId;

use crate::error::CliError;
use crate::output;

pub async fn show(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    let lines = storefront.cart_lines().await?;
    output::cart(out, &lines)?;
    Ok(())
}

pub fn add(storefront: &Storefront, id: ProductId, quantity: i32) -> Result<(), CliError> {
    storefront.add_to_cart(id, quantity)?;
    info!(
        product_id = %id,
        quantity = storefront.cart().quantity(id),
        "Added to cart"
    );
    Ok(())
}

/// Set a line's quantity; zero or below removes it.
pub fn set(storefront: &Storefront, id: ProductId, quantity: i32) -> Result<(), CliError> {
    let changed = storefront.cart().set_quantity(id, quantity)?;
    if !changed {
        return Err(CliError::InvalidArgument(format!(
            "product {id} is not in the cart"
        )));
    }
    info!(product_id = %id, quantity, "Cart updated");
    Ok(())
}

pub fn remove(storefront: &Storefront, id: ProductId) -> Result<(), CliError> {
    if storefront.cart().remove(id)? {
        info!(product_id = %id, "Removed from cart");
    } else {
        info!(product_id = %id, "Product was not in the cart");
    }
    Ok(())
}

pub fn clear(storefront: &Storefront) -> Result<(), CliError> {
    storefront.cart().clear()?;
    info!(session = %storefront.session_key(), "Cart cleared");
    Ok(())
}
