//! Cart state: the locally persisted list of cart lines.
//!
//! Lines are kept in insertion order and keyed by `(id, spec)`. Every
//! mutation that changes the list writes the whole list to the persistent
//! store's `cartItems` entry before the lock is released, so the store and the
//! in-memory list never disagree.

use std::num::NonZeroU32;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use rust_decimal::Decimal;
use teamall_core::{CartItem, ProductId, sum_amounts};

use crate::storage::{PersistentStore, StorageError, keys};

/// Cart lines mirrored to the persistent store.
pub struct CartState {
    store: Arc<dyn PersistentStore>,
    items: RwLock<Vec<CartItem>>,
}

impl CartState {
    /// Hydrate the cart from `store`.
    ///
    /// A `cartItems` entry that does not parse is removed and the cart starts
    /// empty.
    #[must_use]
    pub fn initialize(store: Arc<dyn PersistentStore>) -> Self {
        let items = match store.get(keys::CART_ITEMS) {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable stored cart");
                if let Err(e) = store.remove(keys::CART_ITEMS) {
                    tracing::error!(error = %e, "Failed to discard stored cart");
                }
                Vec::new()
            }),
        };

        Self {
            store,
            items: RwLock::new(items),
        }
    }

    /// Snapshot of the lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Add a line, or merge it into the line with the same `(id, spec)` by
    /// adding quantities.
    pub fn add_item(&self, item: CartItem) {
        let mut items = self.write();
        if let Some(existing) = items.iter_mut().find(|i| i.matches(item.id, &item.spec)) {
            existing.quantity = existing.quantity.saturating_add(item.quantity.get());
            tracing::debug!(id = %item.id, spec = %item.spec, quantity = existing.quantity.get(), "Merged cart line");
        } else {
            tracing::debug!(id = %item.id, spec = %item.spec, "Added cart line");
            items.push(item);
        }
        self.persist(&items);
    }

    /// Remove the line with this identity. Returns whether one was removed.
    pub fn remove_item(&self, id: ProductId, spec: &str) -> bool {
        let mut items = self.write();
        let Some(index) = items.iter().position(|i| i.matches(id, spec)) else {
            return false;
        };
        items.remove(index);
        self.persist(&items);
        true
    }

    /// Set the quantity of the line with this identity. Returns whether a line
    /// matched.
    pub fn update_quantity(&self, id: ProductId, spec: &str, quantity: NonZeroU32) -> bool {
        self.update(id, spec, |item| item.quantity = quantity)
    }

    /// Tick or untick the line with this identity for checkout. Returns
    /// whether a line matched.
    pub fn set_selected(&self, id: ProductId, spec: &str, selected: bool) -> bool {
        self.update(id, spec, |item| item.selected = selected)
    }

    /// Remove every line.
    pub fn clear(&self) {
        let mut items = self.write();
        items.clear();
        self.persist(&items);
    }

    /// Number of lines (not units).
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Sum of price times quantity over every line, selected or not.
    /// Saturates rather than overflowing.
    #[must_use]
    pub fn total(&self) -> Decimal {
        sum_amounts(
            self.items
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(CartItem::subtotal),
        )
    }

    /// Sum of price times quantity over the selected lines.
    #[must_use]
    pub fn selected_total(&self) -> Decimal {
        sum_amounts(
            self.items
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|i| i.selected)
                .map(CartItem::subtotal),
        )
    }

    fn update(&self, id: ProductId, spec: &str, apply: impl FnOnce(&mut CartItem)) -> bool {
        let mut items = self.write();
        let Some(item) = items.iter_mut().find(|i| i.matches(id, spec)) else {
            return false;
        };
        apply(item);
        self.persist(&items);
        true
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<CartItem>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[CartItem]) {
        let result = serde_json::to_string(items)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(keys::CART_ITEMS, &json));
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn line(id: i64, spec: &str, quantity: u32, price: i64) -> CartItem {
        CartItem::new(ProductId::new(id), spec, qty(quantity), Decimal::from(price))
    }

    fn empty_cart() -> (Arc<MemoryStore>, CartState) {
        let store = Arc::new(MemoryStore::new());
        let cart = CartState::initialize(store.clone());
        (store, cart)
    }

    fn stored(store: &MemoryStore) -> Vec<CartItem> {
        serde_json::from_str(&store.get(keys::CART_ITEMS).unwrap()).unwrap()
    }

    #[test]
    fn test_add_merges_same_id_and_spec() {
        let (_, cart) = empty_cart();
        cart.add_item(line(1, "M", 2, 10));
        cart.add_item(line(1, "M", 3, 10));

        assert_eq!(cart.items(), vec![line(1, "M", 5, 10)]);
        assert_eq!(cart.total(), Decimal::from(50));
    }

    #[test]
    fn test_same_product_different_spec_is_separate_line() {
        let (_, cart) = empty_cart();
        cart.add_item(line(1, "M", 1, 10));
        cart.add_item(line(1, "L", 1, 12));
        cart.add_item(line(2, "M", 1, 8));

        let specs: Vec<_> = cart.items().into_iter().map(|i| (i.id.as_i64(), i.spec)).collect();
        assert_eq!(
            specs,
            vec![(1, "M".to_string()), (1, "L".to_string()), (2, "M".to_string())]
        );
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_merged_quantity_is_sum_of_adds() {
        let (_, cart) = empty_cart();
        for n in 1..=10 {
            cart.add_item(line(4, "gift box", n, 3));
        }
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.items().first().map(|i| i.quantity.get()), Some(55));
    }

    #[test]
    fn test_merge_saturates() {
        let (_, cart) = empty_cart();
        cart.add_item(line(1, "", u32::MAX, 1));
        cart.add_item(line(1, "", 5, 1));
        assert_eq!(cart.items().first().map(|i| i.quantity.get()), Some(u32::MAX));
    }

    #[test]
    fn test_totals_saturate_on_huge_stored_cart() {
        let store = Arc::new(MemoryStore::with_entries([(
            keys::CART_ITEMS,
            r#"[{"id":1,"spec":"M","quantity":4000000000,"price":"79228162514264337593543950"},
                {"id":2,"spec":"M","quantity":1,"price":"1"}]"#,
        )]));
        let cart = CartState::initialize(store);

        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total(), Decimal::MAX);
        assert_eq!(cart.selected_total(), Decimal::MAX);
    }

    #[test]
    fn test_total_saturates_after_merge_to_max_quantity() {
        let (_, cart) = empty_cart();
        let price = Decimal::MAX / Decimal::from(2);
        cart.add_item(CartItem::new(ProductId::new(1), "", qty(u32::MAX), price));
        cart.add_item(CartItem::new(ProductId::new(1), "", qty(9), price));

        assert_eq!(cart.total(), Decimal::MAX);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, cart) = empty_cart();
        cart.add_item(line(1, "M", 1, 10));
        cart.add_item(line(2, "M", 1, 10));

        assert!(cart.remove_item(ProductId::new(1), "M"));
        assert!(!cart.remove_item(ProductId::new(1), "M"));
        assert_eq!(stored(&store), vec![line(2, "M", 1, 10)]);
    }

    #[test]
    fn test_update_quantity_and_selection() {
        let (store, cart) = empty_cart();
        cart.add_item(line(1, "M", 1, 10));
        cart.add_item(line(2, "S", 1, 4));

        assert!(cart.update_quantity(ProductId::new(1), "M", qty(4)));
        assert!(!cart.update_quantity(ProductId::new(1), "XL", qty(9)));
        assert!(cart.set_selected(ProductId::new(2), "S", false));

        assert_eq!(cart.total(), Decimal::from(44));
        assert_eq!(cart.selected_total(), Decimal::from(40));
        assert_eq!(stored(&store), cart.items());
    }

    #[test]
    fn test_clear_persists_empty_list() {
        let (store, cart) = empty_cart();
        cart.add_item(line(1, "M", 1, 10));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(store.get(keys::CART_ITEMS).as_deref(), Some("[]"));
    }

    #[test]
    fn test_store_matches_memory_after_every_mutation() {
        let (store, cart) = empty_cart();
        cart.add_item(line(3, "250g", 1, 68));
        assert_eq!(stored(&store), cart.items());
        cart.add_item(line(1, "M", 2, 10));
        assert_eq!(stored(&store), cart.items());
        cart.add_item(line(3, "250g", 2, 68));
        assert_eq!(stored(&store), cart.items());
        cart.update_quantity(ProductId::new(1), "M", qty(7));
        assert_eq!(stored(&store), cart.items());
        cart.remove_item(ProductId::new(3), "250g");
        assert_eq!(stored(&store), cart.items());
    }

    #[test]
    fn test_initialize_hydrates_in_order() {
        let (store, cart) = empty_cart();
        cart.add_item(line(9, "A", 1, 1));
        cart.add_item(line(8, "B", 2, 2));

        let reloaded = CartState::initialize(store);
        assert_eq!(reloaded.items(), cart.items());
    }

    #[test]
    fn test_initialize_discards_corrupt_cart() {
        let store = Arc::new(MemoryStore::with_entries([(keys::CART_ITEMS, "[{\"id\":")]));
        let cart = CartState::initialize(store.clone());
        assert!(cart.is_empty());
        assert_eq!(store.get(keys::CART_ITEMS), None);
    }
}
