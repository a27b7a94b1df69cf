//! The cart store: owns the in-memory cart and its persisted mirror.
//!
//! Mutations follow one shape: validate against the inventory service,
//! compute the next cart state with the pure transitions from `shoebox-core`,
//! then commit. Commit persists the candidate state first and only then swaps
//! it in as the snapshot, so a failure anywhere leaves the in-memory cart
//! equal to the last persisted one and readers never see a partial state.
//!
//! Mutations take `&mut self`; the borrow checker serializes overlapping
//! calls per store instance, so there is no window where two in-flight
//! lookups race to commit.

use tracing::{debug, instrument};

use shoebox_core::{Cart, ProductId};

use crate::error::{CartError, StorageError};
use crate::inventory::InventorySource;
use crate::notify::{NotificationSink, warnings};
use crate::storage::CartStorage;

/// Owns the single session cart and enforces its invariants.
///
/// Generic over the three collaborator seams: inventory lookups, durable
/// storage, and the warning sink.
#[derive(Debug)]
pub struct CartStore<I, S, N> {
    inventory: I,
    storage: S,
    notifier: N,
    key: String,
    cart: Cart,
}

impl<I, S, N> CartStore<I, S, N>
where
    I: InventorySource,
    S: CartStorage,
    N: NotificationSink,
{
    /// Create a store seeded from persisted storage under `key`.
    ///
    /// Never fails: an absent, unreadable, or unparsable payload seeds an
    /// empty cart. Corrupt state is logged and otherwise treated as no prior
    /// cart.
    pub fn hydrate(inventory: I, storage: S, notifier: N, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = match storage.load(&key) {
            Ok(Some(payload)) => match serde_json::from_str::<Cart>(&payload) {
                Ok(cart) => cart,
                Err(e) => {
                    debug!(error = %e, %key, "persisted cart is unparsable, starting empty");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                debug!(error = %e, %key, "persisted cart is unreadable, starting empty");
                Cart::new()
            }
        };
        Self {
            inventory,
            storage,
            notifier,
            key,
            cart,
        }
    }

    /// The committed cart snapshot.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of `product_id` to the cart.
    ///
    /// An existing entry is incremented, subject to the freshly fetched stock
    /// bound; a product not yet in the cart gets a new entry at quantity one.
    ///
    /// # Errors
    ///
    /// `StockExceeded` when the increment would exceed available stock,
    /// `Inventory` when a lookup fails, `Storage` when persisting fails. The
    /// cart is unchanged on every error and the matching warning has been
    /// emitted through the sink.
    #[instrument(skip(self))]
    pub async fn add_item(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let outcome = self.try_add(product_id).await;
        if let Err(e) = &outcome {
            self.notify_failure(e, warnings::ADD_FAILED);
        }
        outcome
    }

    async fn try_add(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let stock = self.inventory.fetch_stock(product_id).await?;
        let next = if self.cart.contains(product_id) {
            self.cart.with_incremented(product_id, stock.amount)?
        } else {
            // Fresh lines go in at quantity one without re-checking stock; a
            // product the catalog still lists is assumed to have at least one
            // unit. Only the increment path enforces the bound.
            let product = self.inventory.fetch_product(product_id).await?;
            self.cart.with_added(product)
        };
        self.commit(next)?;
        Ok(())
    }

    /// Remove the entry for `product_id`.
    ///
    /// Synchronous: removal needs no stock validation.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` when the product has no entry, `Storage` when
    /// persisting fails. The cart is unchanged on every error and the warning
    /// has been emitted through the sink.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let outcome = self
            .cart
            .without(product_id)
            .map_err(CartError::from)
            .and_then(|next| self.commit(next).map_err(CartError::from));
        if let Err(e) = &outcome {
            self.notify_failure(e, warnings::REMOVE_FAILED);
        }
        outcome
    }

    /// Set the entry for `product_id` to `amount` units.
    ///
    /// `amount` is the target quantity, not a delta. Zero and negative
    /// amounts are a guarded no-op: no mutation, no warning.
    ///
    /// # Errors
    ///
    /// `StockExceeded` when `amount` exceeds available stock,
    /// `EntryNotFound` when the product has no entry, `Inventory` when the
    /// stock lookup fails, `Storage` when persisting fails. The cart is
    /// unchanged on every error and the matching warning has been emitted
    /// through the sink.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &mut self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<(), CartError> {
        if amount <= 0 {
            return Ok(());
        }
        // Amounts beyond u32 are clamped so they still reach the stock
        // comparison and reject, rather than silently dropping out here.
        let quantity = u32::try_from(amount).unwrap_or(u32::MAX);
        let outcome = self.try_update(product_id, quantity).await;
        if let Err(e) = &outcome {
            self.notify_failure(e, warnings::UPDATE_FAILED);
        }
        outcome
    }

    async fn try_update(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        let stock = self.inventory.fetch_stock(product_id).await?;
        let next = self.cart.with_quantity(product_id, quantity, stock.amount)?;
        self.commit(next)?;
        Ok(())
    }

    /// Empty the cart and persist the empty sequence.
    ///
    /// # Errors
    ///
    /// `Storage` when persisting fails; the cart is unchanged.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.commit(Cart::new())?;
        Ok(())
    }

    /// Persist `next`, then make it the committed snapshot.
    ///
    /// Ordering is the rollback mechanism: a failed save returns before the
    /// swap, leaving the snapshot equal to the last persisted state.
    fn commit(&mut self, next: Cart) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&next)?;
        self.storage.save(&self.key, &payload)?;
        self.cart = next;
        Ok(())
    }

    /// Emit the warning for a failed mutation.
    ///
    /// Stock rejections always get the stock message; everything else gets
    /// the operation's generic message.
    fn notify_failure(&self, error: &CartError, fallback: &'static str) {
        let message = match error {
            CartError::StockExceeded { .. } => warnings::OUT_OF_STOCK,
            _ => fallback,
        };
        self.notifier.warn(message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use shoebox_core::{Product, StockRecord};

    use super::*;
    use crate::error::InventoryError;
    use crate::storage::MemoryStorage;

    const KEY: &str = "@shoebox:cart";

    /// HashMap-backed inventory with a failure toggle.
    #[derive(Default)]
    struct FakeInventory {
        products: HashMap<i64, Product>,
        stock: HashMap<i64, u32>,
        down: bool,
    }

    impl FakeInventory {
        fn with(entries: &[(i64, &str, u32)]) -> Self {
            let mut inventory = Self::default();
            for &(id, price, amount) in entries {
                inventory.products.insert(
                    id,
                    Product {
                        id: ProductId::new(id),
                        title: format!("Sneaker {id}"),
                        price: price.parse().unwrap(),
                        image: format!("https://cdn.example.com/{id}.jpg"),
                    },
                );
                inventory.stock.insert(id, amount);
            }
            inventory
        }

        fn offline() -> Self {
            Self {
                down: true,
                ..Self::default()
            }
        }
    }

    impl InventorySource for FakeInventory {
        async fn fetch_stock(&self, id: ProductId) -> Result<StockRecord, InventoryError> {
            if self.down {
                return Err(InventoryError::Status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            self.stock
                .get(&id.as_i64())
                .map(|&amount| StockRecord { id, amount })
                .ok_or(InventoryError::NotFound(id))
        }

        async fn fetch_product(&self, id: ProductId) -> Result<Product, InventoryError> {
            if self.down {
                return Err(InventoryError::Status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            self.products
                .get(&id.as_i64())
                .cloned()
                .ok_or(InventoryError::NotFound(id))
        }
    }

    /// Sink that records every warning; clones share the record.
    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    impl RecordingSink {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn warn(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    /// Storage whose saves always fail; loads delegate to a memory store.
    struct FailingStorage(MemoryStorage);

    impl CartStorage for FailingStorage {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.load(key)
        }

        fn save(&mut self, _key: &str, _payload: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
    }

    fn store_with(
        inventory: FakeInventory,
    ) -> (
        CartStore<FakeInventory, MemoryStorage, RecordingSink>,
        MemoryStorage,
        RecordingSink,
    ) {
        let storage = MemoryStorage::new();
        let sink = RecordingSink::default();
        let store = CartStore::hydrate(inventory, storage.clone(), sink.clone(), KEY);
        (store, storage, sink)
    }

    fn persisted(storage: &MemoryStorage) -> Cart {
        serde_json::from_str(&storage.load(KEY).unwrap().unwrap()).unwrap()
    }

    fn quantities(cart: &Cart) -> Vec<(i64, u32)> {
        cart.entries()
            .iter()
            .map(|e| (e.product_id().as_i64(), e.quantity))
            .collect()
    }

    #[tokio::test]
    async fn test_add_to_empty_cart() {
        let (mut store, storage, sink) = store_with(FakeInventory::with(&[(1, "179.90", 5)]));

        store.add_item(ProductId::new(1)).await.unwrap();

        assert_eq!(quantities(store.cart()), vec![(1, 1)]);
        assert_eq!(&persisted(&storage), store.cart());
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_entry_increments() {
        let (mut store, storage, _) = store_with(FakeInventory::with(&[(1, "179.90", 5)]));

        store.add_item(ProductId::new(1)).await.unwrap();
        store.add_item(ProductId::new(1)).await.unwrap();

        assert_eq!(quantities(store.cart()), vec![(1, 2)]);
        assert_eq!(&persisted(&storage), store.cart());
    }

    #[tokio::test]
    async fn test_add_rejects_when_stock_exhausted() {
        let (mut store, storage, sink) = store_with(FakeInventory::with(&[(1, "179.90", 1)]));
        store.add_item(ProductId::new(1)).await.unwrap();
        let before = store.cart().clone();

        let err = store.add_item(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::StockExceeded {
                requested: 2,
                available: 1
            }
        ));
        assert_eq!(store.cart(), &before);
        assert_eq!(&persisted(&storage), &before);
        assert_eq!(sink.messages(), vec![warnings::OUT_OF_STOCK]);
    }

    #[tokio::test]
    async fn test_add_new_entry_skips_stock_check() {
        // The fresh-line path inserts at quantity one even when the reported
        // stock is zero; only the increment path enforces the bound.
        let (mut store, _, sink) = store_with(FakeInventory::with(&[(1, "179.90", 0)]));

        store.add_item(ProductId::new(1)).await.unwrap();

        assert_eq!(quantities(store.cart()), vec![(1, 1)]);
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_add_fails_when_inventory_offline() {
        let (mut store, _, sink) = store_with(FakeInventory::offline());

        let err = store.add_item(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, CartError::Inventory(_)));
        assert!(store.cart().is_empty());
        assert_eq!(sink.messages(), vec![warnings::ADD_FAILED]);
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let (mut store, _, sink) = store_with(FakeInventory::with(&[]));

        let err = store.add_item(ProductId::new(42)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::Inventory(InventoryError::NotFound(_))
        ));
        assert!(store.cart().is_empty());
        assert_eq!(sink.messages(), vec![warnings::ADD_FAILED]);
    }

    #[tokio::test]
    async fn test_remove_preserves_order_of_rest() {
        let (mut store, storage, sink) =
            store_with(FakeInventory::with(&[(1, "179.90", 5), (2, "139.90", 5)]));
        store.add_item(ProductId::new(1)).await.unwrap();
        store.add_item(ProductId::new(1)).await.unwrap();
        store.add_item(ProductId::new(2)).await.unwrap();

        store.remove_item(ProductId::new(1)).unwrap();

        assert_eq!(quantities(store.cart()), vec![(2, 1)]);
        assert_eq!(&persisted(&storage), store.cart());
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_entry() {
        let (mut store, _, sink) = store_with(FakeInventory::with(&[]));

        let err = store.remove_item(ProductId::new(99)).unwrap_err();

        assert!(matches!(err, CartError::EntryNotFound(_)));
        assert!(store.cart().is_empty());
        assert_eq!(sink.messages(), vec![warnings::REMOVE_FAILED]);
    }

    #[tokio::test]
    async fn test_update_sets_target_quantity() {
        let (mut store, storage, sink) = store_with(FakeInventory::with(&[(1, "179.90", 10)]));
        store.add_item(ProductId::new(1)).await.unwrap();

        store.update_quantity(ProductId::new(1), 5).await.unwrap();

        assert_eq!(quantities(store.cart()), vec![(1, 5)]);
        assert_eq!(&persisted(&storage), store.cart());
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_zero_or_negative_is_guarded_noop() {
        let (mut store, storage, sink) = store_with(FakeInventory::with(&[(1, "179.90", 10)]));
        store.add_item(ProductId::new(1)).await.unwrap();
        let before = store.cart().clone();

        store.update_quantity(ProductId::new(1), 0).await.unwrap();
        store.update_quantity(ProductId::new(1), -3).await.unwrap();

        assert_eq!(store.cart(), &before);
        assert_eq!(&persisted(&storage), &before);
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_over_stock() {
        let (mut store, _, sink) = store_with(FakeInventory::with(&[(1, "179.90", 3)]));
        store.add_item(ProductId::new(1)).await.unwrap();
        let before = store.cart().clone();

        let err = store.update_quantity(ProductId::new(1), 4).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::StockExceeded {
                requested: 4,
                available: 3
            }
        ));
        assert_eq!(store.cart(), &before);
        assert_eq!(sink.messages(), vec![warnings::OUT_OF_STOCK]);
    }

    #[tokio::test]
    async fn test_update_amount_beyond_u32_rejects_as_over_stock() {
        let (mut store, storage, sink) = store_with(FakeInventory::with(&[(1, "179.90", 3)]));
        store.add_item(ProductId::new(1)).await.unwrap();
        let before = store.cart().clone();

        let err = store
            .update_quantity(ProductId::new(1), i64::from(u32::MAX) + 1)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::StockExceeded { .. }));
        assert_eq!(store.cart(), &before);
        assert_eq!(&persisted(&storage), &before);
        assert_eq!(sink.messages(), vec![warnings::OUT_OF_STOCK]);
    }

    #[tokio::test]
    async fn test_update_missing_entry() {
        let (mut store, _, sink) = store_with(FakeInventory::with(&[(1, "179.90", 10)]));

        let err = store.update_quantity(ProductId::new(1), 2).await.unwrap_err();

        assert!(matches!(err, CartError::EntryNotFound(_)));
        assert_eq!(sink.messages(), vec![warnings::UPDATE_FAILED]);
    }

    #[tokio::test]
    async fn test_update_fails_when_inventory_offline() {
        let (mut store, _, sink) = store_with(FakeInventory::offline());

        let err = store.update_quantity(ProductId::new(1), 2).await.unwrap_err();

        assert!(matches!(err, CartError::Inventory(_)));
        assert_eq!(sink.messages(), vec![warnings::UPDATE_FAILED]);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_in_memory_state() {
        let inventory = FakeInventory::with(&[(1, "179.90", 5)]);
        let sink = RecordingSink::default();
        let storage = FailingStorage(MemoryStorage::new());
        let mut store = CartStore::hydrate(inventory, storage, sink.clone(), KEY);

        let err = store.add_item(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, CartError::Storage(_)));
        assert!(store.cart().is_empty());
        assert_eq!(sink.messages(), vec![warnings::ADD_FAILED]);
    }

    #[tokio::test]
    async fn test_rehydration_is_idempotent() {
        let inventory = FakeInventory::with(&[(1, "179.90", 5), (2, "139.90", 5)]);
        let (mut store, storage, _) = store_with(inventory);
        store.add_item(ProductId::new(1)).await.unwrap();
        store.add_item(ProductId::new(2)).await.unwrap();
        let committed = store.cart().clone();
        drop(store);

        let restored = CartStore::hydrate(
            FakeInventory::default(),
            storage.clone(),
            RecordingSink::default(),
            KEY,
        );
        assert_eq!(restored.cart(), &committed);

        let again = CartStore::hydrate(
            FakeInventory::default(),
            storage,
            RecordingSink::default(),
            KEY,
        );
        assert_eq!(again.cart(), &committed);
    }

    #[tokio::test]
    async fn test_corrupt_payload_hydrates_empty() {
        let storage = MemoryStorage::with_payload(KEY, "{not json");
        let store = CartStore::hydrate(
            FakeInventory::default(),
            storage,
            RecordingSink::default(),
            KEY,
        );
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_and_persists() {
        let (mut store, storage, _) = store_with(FakeInventory::with(&[(1, "179.90", 5)]));
        store.add_item(ProductId::new(1)).await.unwrap();

        store.clear().unwrap();

        assert!(store.cart().is_empty());
        assert!(persisted(&storage).is_empty());
    }

    #[tokio::test]
    async fn test_quantity_never_exceeds_stock_over_add_sequence() {
        let (mut store, _, sink) = store_with(FakeInventory::with(&[(1, "179.90", 3)]));

        for _ in 0..5 {
            let _ = store.add_item(ProductId::new(1)).await;
        }

        assert_eq!(quantities(store.cart()), vec![(1, 3)]);
        assert_eq!(
            sink.messages(),
            vec![warnings::OUT_OF_STOCK, warnings::OUT_OF_STOCK]
        );
    }
}
