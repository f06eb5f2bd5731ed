//! Shopping Cart State Management
//!
//! `CartStore` owns the shopper's cart lines, derives totals on every read
//! and writes the full cart to durable storage after each mutation.

use super::{
    models::{CartLine, CartSnapshotRef, StoredCart, CART_SNAPSHOT_VERSION},
    storage::{CartStorage, StorageError},
};
use crate::backend::{OrderItem, Product, ProductId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixed storage key the cart is persisted under
pub const CART_STORAGE_KEY: &str = "cart";

pub struct CartStore {
    /// Insertion-ordered, at most one line per product id
    lines: Vec<CartLine>,
    storage: Arc<dyn CartStorage>,
}

impl CartStore {
    /// Opens the cart, restoring the persisted snapshot when it is readable.
    ///
    /// Missing, corrupt or unknown-version payloads yield an empty cart.
    pub fn open(storage: Arc<dyn CartStorage>) -> Self {
        let lines = restore_lines(storage.as_ref());
        debug!(lines = lines.len(), "Cart opened");
        Self { lines, storage }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds `quantity` units of `product`, merging into an existing line.
    ///
    /// A zero quantity is ignored, as is a product whose price is not a
    /// finite non-negative number. The product is captured as-is, including
    /// its current price.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            debug!(product_id = product.id, "Ignoring add with zero quantity");
            return;
        }
        if !product.price.is_finite() || product.price < 0.0 {
            warn!(
                product_id = product.id,
                price = product.price,
                "Ignoring product with invalid price"
            );
            return;
        }

        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                product: product.clone(),
                quantity,
            }),
        }
        self.persist();
    }

    /// Removes the line for `product_id`; absent ids are ignored.
    pub fn remove_item(&mut self, product_id: ProductId) {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        if self.lines.len() != before {
            self.persist();
        }
    }

    /// Sets the absolute quantity of a line. Zero removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity;
            self.persist();
        }
    }

    pub fn clear_cart(&mut self) {
        self.lines.clear();
        self.persist();
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities over all lines
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of snapshot unit price times quantity over all lines
    pub fn total_amount(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn order_items(&self) -> Vec<OrderItem> {
        self.lines.iter().map(CartLine::to_order_item).collect()
    }

    /// The payload written to storage for the current lines
    pub fn to_json(&self) -> Result<String, StorageError> {
        let snapshot = CartSnapshotRef {
            version: CART_SNAPSHOT_VERSION,
            items: &self.lines,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Writes the whole cart. Failures are logged and otherwise ignored: the
    /// in-memory lines stay authoritative for this session.
    fn persist(&self) {
        let result = self
            .to_json()
            .and_then(|payload| self.storage.save(CART_STORAGE_KEY, &payload));
        if let Err(err) = result {
            warn!(error = %err, "Failed to persist cart");
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

fn restore_lines(storage: &dyn CartStorage) -> Vec<CartLine> {
    let raw = match storage.load(CART_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(error = %err, "Failed to read persisted cart, starting empty");
            return Vec::new();
        }
    };

    let lines = match serde_json::from_str::<StoredCart>(&raw) {
        Ok(StoredCart::Versioned(snapshot)) if snapshot.version == CART_SNAPSHOT_VERSION => {
            snapshot.items
        }
        Ok(StoredCart::Versioned(snapshot)) => {
            warn!(version = snapshot.version, "Discarding cart with unknown version");
            return Vec::new();
        }
        Ok(StoredCart::Legacy(items)) => {
            info!(lines = items.len(), "Migrating unversioned cart");
            items
        }
        Err(err) => {
            warn!(error = %err, "Discarding unreadable cart");
            return Vec::new();
        }
    };

    normalize_lines(lines).unwrap_or_else(|| {
        warn!("Discarding cart with a zero-quantity line");
        Vec::new()
    })
}

/// Merges duplicate product ids; `None` if any line has zero quantity.
fn normalize_lines(lines: Vec<CartLine>) -> Option<Vec<CartLine>> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            return None;
        }
        match merged.iter_mut().find(|l| l.product.id == line.product.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::storage::MemoryStorage;
    use proptest::prelude::*;
    use serde_json::json;

    fn product(id: ProductId, name: &str, price: f64) -> Product {
        Product {
            id,
            name: name.into(),
            description: String::new(),
            price,
            available: true,
            image_url: String::new(),
            category_id: None,
        }
    }

    fn tea() -> Product {
        product(1, "Tea", 50.0)
    }

    fn open_memory() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone());
        (storage, store)
    }

    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    #[test]
    fn test_add_same_product_aggregates() {
        let (_, mut cart) = open_memory();

        cart.add_item(&tea(), 2);
        cart.add_item(&tea(), 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.line(1).unwrap().quantity, 5, "2 + 3 should aggregate to 5");
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let (storage, mut cart) = open_memory();

        cart.add_item(&tea(), 0);

        assert!(cart.is_empty());
        assert!(storage.get(CART_STORAGE_KEY).is_none(), "no-op must not write");
    }

    #[test]
    fn test_add_product_with_invalid_price_is_ignored() {
        let (storage, mut cart) = open_memory();
        cart.add_item(&tea(), 1);

        cart.add_item(&product(2, "Mystery", f64::NAN), 1);
        cart.add_item(&product(3, "Infinite", f64::INFINITY), 1);

        assert_eq!(cart.items().len(), 1);
        let reopened = CartStore::open(storage);
        assert_eq!(reopened.items(), cart.items(), "existing lines must survive a reload");
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let (_, mut cart) = open_memory();
        cart.add_item(&tea(), 2);
        cart.add_item(&product(2, "Coffee", 80.0), 1);

        cart.update_quantity(1, 0);

        assert!(cart.line(1).is_none());
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_update_quantity_sets_absolute_value() {
        let (_, mut cart) = open_memory();
        cart.add_item(&tea(), 2);

        cart.update_quantity(1, 7);
        cart.update_quantity(99, 4);

        assert_eq!(cart.line(1).unwrap().quantity, 7);
        assert!(cart.line(99).is_none(), "absent products are not added");
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let (_, mut cart) = open_memory();
        cart.add_item(&tea(), 2);
        let before = cart.items().to_vec();

        cart.remove_item(42);

        assert_eq!(cart.items(), before.as_slice());
    }

    #[test]
    fn test_clear_cart_twice() {
        let (storage, mut cart) = open_memory();
        cart.add_item(&tea(), 2);

        cart.clear_cart();
        cart.clear_cart();

        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_amount(), 0.0);
        let saved: serde_json::Value =
            serde_json::from_str(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(saved["items"], json!([]));
    }

    #[test]
    fn test_snapshot_price_survives_catalog_change() {
        let (_, mut cart) = open_memory();
        cart.add_item(&tea(), 2);

        // Catalog now sells tea for more; the existing line keeps its price.
        cart.add_item(&product(1, "Tea", 65.0), 1);

        assert_eq!(cart.line(1).unwrap().product.price, 50.0);
        assert_eq!(cart.total_amount(), 150.0);
    }

    #[test]
    fn test_reopen_restores_lines_in_order() {
        let (storage, mut cart) = open_memory();
        cart.add_item(&product(2, "Coffee", 80.0), 1);
        cart.add_item(&tea(), 2);

        let reopened = CartStore::open(storage);

        assert_eq!(reopened.items(), cart.items());
        assert_eq!(reopened.items()[0].product.name, "Coffee");
    }

    #[test]
    fn test_persisted_payload_is_versioned() {
        let (storage, mut cart) = open_memory();
        cart.add_item(&tea(), 2);

        let saved: serde_json::Value =
            serde_json::from_str(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(saved["version"], CART_SNAPSHOT_VERSION);
        assert_eq!(saved["items"][0]["quantity"], 2);
        assert_eq!(saved["items"][0]["product"]["name"], "Tea");
    }

    #[test]
    fn test_unversioned_payload_is_migrated() {
        let legacy = json!([
            { "product": { "id": 1, "name": "Tea", "price": 50.0, "imageUrl": "", "available": true, "description": "" }, "quantity": 2 },
            { "product": { "id": 1, "name": "Tea", "price": 50.0, "imageUrl": "", "available": true, "description": "" }, "quantity": 1 }
        ]);
        let storage = Arc::new(MemoryStorage::with_entry(CART_STORAGE_KEY, legacy.to_string()));

        let cart = CartStore::open(storage);

        assert_eq!(cart.items().len(), 1, "duplicate ids are merged");
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_corrupt_or_unknown_payloads_start_empty() {
        for raw in [
            "not json".to_string(),
            json!({ "version": 99, "items": [] }).to_string(),
            json!([{ "product": { "id": 1, "name": "Tea", "price": 50.0 }, "quantity": 0 }]).to_string(),
        ] {
            let storage = Arc::new(MemoryStorage::with_entry(CART_STORAGE_KEY, raw.clone()));
            let cart = CartStore::open(storage);
            assert!(cart.is_empty(), "payload {raw} should be discarded");
        }
    }

    #[test]
    fn test_storage_failures_do_not_block_mutations() {
        let mut cart = CartStore::open(Arc::new(BrokenStorage));

        cart.add_item(&tea(), 2);
        cart.update_quantity(1, 4);

        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.total_amount(), 200.0);
    }

    proptest! {
        #[test]
        fn totals_match_distinct_adds(quantities in proptest::collection::vec(1u32..50, 0..20)) {
            let (_, mut cart) = open_memory();
            for (i, q) in quantities.iter().enumerate() {
                cart.add_item(&product(i as ProductId + 1, "Item", 2.5), *q);
            }

            let expected: u64 = quantities.iter().map(|q| u64::from(*q)).sum();
            prop_assert_eq!(cart.total_items(), expected);
            prop_assert_eq!(cart.items().len(), quantities.len());
        }

        #[test]
        fn update_to_zero_equals_remove(
            quantities in proptest::collection::vec(1u32..10, 1..10),
            pick in any::<proptest::sample::Index>(),
        ) {
            let (_, mut updated) = open_memory();
            let (_, mut removed) = open_memory();
            for (i, q) in quantities.iter().enumerate() {
                let p = product(i as ProductId + 1, "Item", 1.0);
                updated.add_item(&p, *q);
                removed.add_item(&p, *q);
            }
            let target = pick.index(quantities.len()) as ProductId + 1;

            updated.update_quantity(target, 0);
            removed.remove_item(target);

            prop_assert_eq!(updated.items(), removed.items());
        }

        #[test]
        fn reopen_is_structurally_equal(quantities in proptest::collection::vec(1u32..10, 0..10)) {
            let (storage, mut cart) = open_memory();
            for (i, q) in quantities.iter().enumerate() {
                cart.add_item(&product(i as ProductId + 1, "Item", 0.75 * (i as f64 + 1.0)), *q);
            }

            let reopened = CartStore::open(storage);
            prop_assert_eq!(reopened.items(), cart.items());
        }
    }
}
