//! Local cart commands.
//!
//! These only touch the persisted cart; nothing is sent to the backend.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use teamall_client::Storefront;
use teamall_core::{CartItem, ProductId};

use crate::output;

/// No line with the given product and spec.
#[derive(Debug, thiserror::Error)]
#[error("No cart line for product {id} with spec {spec:?}")]
pub struct NoSuchLine {
    id: ProductId,
    spec: String,
}

pub fn list(shop: &Storefront) {
    let cart = shop.cart();
    if cart.is_empty() {
        output::line("Cart is empty");
        return;
    }

    for item in cart.items() {
        output::line(format_args!(
            "[{}] {} {} x{} @ {} = {}  {}",
            if item.selected { 'x' } else { ' ' },
            item.id,
            if item.spec.is_empty() { "-" } else { item.spec.as_str() },
            item.quantity,
            item.price,
            item.subtotal(),
            item.name.as_deref().unwrap_or(""),
        ));
    }
    output::line(format_args!("Lines:    {}", cart.count()));
    output::line(format_args!("Total:    {}", cart.total()));
    output::line(format_args!("Selected: {}", cart.selected_total()));
}

pub fn add(
    shop: &Storefront,
    id: i64,
    spec: String,
    quantity: NonZeroU32,
    price: Decimal,
    name: Option<String>,
) {
    let mut item = CartItem::new(ProductId::new(id), spec, quantity, price);
    item.name = name;
    shop.cart().add_item(item);
    output::line(format_args!("Cart now has {} line(s)", shop.cart().count()));
}

pub fn remove(shop: &Storefront, id: i64, spec: &str) {
    if shop.cart().remove_item(ProductId::new(id), spec) {
        output::line("Removed");
    } else {
        output::line("Nothing to remove");
    }
}

/// # Errors
///
/// Returns `NoSuchLine` if no line matches.
pub fn set_quantity(
    shop: &Storefront,
    id: i64,
    spec: &str,
    quantity: NonZeroU32,
) -> Result<(), NoSuchLine> {
    let id = ProductId::new(id);
    if shop.cart().update_quantity(id, spec, quantity) {
        Ok(())
    } else {
        Err(NoSuchLine {
            id,
            spec: spec.to_owned(),
        })
    }
}

/// # Errors
///
/// Returns `NoSuchLine` if no line matches.
pub fn select(shop: &Storefront, id: i64, spec: &str, selected: bool) -> Result<(), NoSuchLine> {
    let id = ProductId::new(id);
    if shop.cart().set_selected(id, spec, selected) {
        Ok(())
    } else {
        Err(NoSuchLine {
            id,
            spec: spec.to_owned(),
        })
    }
}

pub fn clear(shop: &Storefront) {
    shop.cart().clear();
    output::line("Cart cleared");
}
