//! A line in the locally persisted cart.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::line_total;

/// One cart line.
///
/// Identity is the `(id, spec)` pair: the same product in a different spec
/// (size, grade, packaging) is a separate line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product id.
    pub id: ProductId,
    /// Spec label; empty when the product has a single spec.
    #[serde(default)]
    pub spec: String,
    pub quantity: NonZeroU32,
    /// Unit price.
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Whether the line is ticked for checkout.
    #[serde(default = "selected_by_default")]
    pub selected: bool,
}

const fn selected_by_default() -> bool {
    true
}

impl CartItem {
    /// Create a selected line with no display metadata.
    #[must_use]
    pub fn new(id: ProductId, spec: impl Into<String>, quantity: NonZeroU32, price: Decimal) -> Self {
        Self {
            id,
            spec: spec.into(),
            quantity,
            price,
            name: None,
            image: None,
            selected: true,
        }
    }

    /// Whether this line has the given identity.
    #[must_use]
    pub fn matches(&self, id: ProductId, spec: &str) -> bool {
        self.id == id && self.spec == spec
    }

    /// Price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        line_total(self.price, self.quantity.get())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_minimal_line() {
        let item: CartItem =
            serde_json::from_value(json!({"id": 1, "spec": "M", "quantity": 2, "price": 10}))
                .unwrap();
        assert!(item.selected);
        assert_eq!(item.subtotal(), Decimal::from(20));
        assert!(item.matches(ProductId::new(1), "M"));
        assert!(!item.matches(ProductId::new(1), "L"));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let parsed = serde_json::from_value::<CartItem>(
            json!({"id": 1, "spec": "M", "quantity": 0, "price": 10}),
        );
        assert!(parsed.is_err());
    }
}
