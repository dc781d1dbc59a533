//! Plain-text rendering of command results.

use std::io::{self, Write};

use shopapp_client::api::{Category, Order, Product};
use shopapp_client::models::{Role, UserProfile};
use shopapp_client::state::CartLine;
use shopapp_client::views::ProductBrowser;
use shopapp_core::Price;

pub fn products(out: &mut impl Write, browser: &ProductBrowser) -> io::Result<()> {
    if browser.products().is_empty() {
        writeln!(out, "No products found.")?;
    }
    for product in browser.products() {
        product_row(out, product)?;
    }

    let pages = browser
        .visible_pages()
        .iter()
        .map(|&label| {
            if label == browser.page() + 1 {
                format!("[{label}]")
            } else {
                label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(
        out,
        "Page {} of {}: {pages}",
        browser.page() + 1,
        browser.total_pages()
    )
}

fn product_row(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(
        out,
        "{:>6}  {:<40} {:>12}",
        product.id.to_string(),
        product.name,
        product.price.to_string()
    )
}

pub fn product_detail(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(out, "#{} {}", product.id, product.name)?;
    writeln!(out, "Price: {}", product.price)?;
    if let Some(category_id) = product.category_id {
        writeln!(out, "Category: {category_id}")?;
    }
    if !product.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", product.description)?;
    }
    if !product.product_images.is_empty() {
        writeln!(out)?;
        for image in &product.product_images {
            writeln!(out, "  {}", image.image_url)?;
        }
    }
    Ok(())
}

pub fn categories(out: &mut impl Write, categories: &[Category]) -> io::Result<()> {
    for category in categories {
        writeln!(out, "{:>6}  {}", category.id.to_string(), category.name)?;
    }
    Ok(())
}

pub fn roles(out: &mut impl Write, roles: &[Role]) -> io::Result<()> {
    for role in roles {
        writeln!(out, "{:>6}  {}", role.id.to_string(), role.name)?;
    }
    Ok(())
}

pub fn cart(out: &mut impl Write, lines: &[CartLine]) -> io::Result<()> {
    if lines.is_empty() {
        return writeln!(out, "Cart is empty.");
    }
    for line in lines {
        writeln!(
            out,
            "{:>6}  {:<40} {:>4} x {:>12} = {:>12}",
            line.product.id.to_string(),
            line.product.name,
            line.quantity,
            line.product.price.to_string(),
            line.total().to_string()
        )?;
    }
    let total: Price = lines.iter().map(CartLine::total).sum();
    writeln!(out, "Total: {total}")
}

pub fn profile(out: &mut impl Write, profile: &UserProfile) -> io::Result<()> {
    writeln!(out, "#{} {}", profile.id, profile.fullname)?;
    writeln!(out, "Phone: {}", profile.phone_number)?;
    if !profile.address.is_empty() {
        writeln!(out, "Address: {}", profile.address)?;
    }
    writeln!(out, "Role: {}", profile.role.name)
}

pub fn order(out: &mut impl Write, order: &Order) -> io::Result<()> {
    order_row(out, order)?;
    for detail in &order.order_details {
        let name = detail.product.as_ref().map_or("-", |p| p.name.as_str());
        writeln!(
            out,
            "        {:<40} {:>4} x {:>12} = {:>12}",
            name,
            detail.number_of_products,
            detail.price.to_string(),
            detail.total_money.to_string()
        )?;
    }
    Ok(())
}

pub fn orders(out: &mut impl Write, orders: &[Order]) -> io::Result<()> {
    if orders.is_empty() {
        return writeln!(out, "No orders found.");
    }
    for order in orders {
        order_row(out, order)?;
    }
    Ok(())
}

fn order_row(out: &mut impl Write, order: &Order) -> io::Result<()> {
    let date = order
        .order_date
        .map_or_else(|| "-".to_string(), |d| d.to_string());
    writeln!(
        out,
        "{:>6}  {:<10} {:<12} {:<30} {:>12}",
        order.id.to_string(),
        date,
        order.status.to_string(),
        order.fullname,
        order.total_money.to_string()
    )
}
