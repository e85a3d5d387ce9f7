//! Store-level tests exercising cart mutations against in-memory doubles.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use sundial_cart::{
    CART_STORAGE_KEY, Cart, CartNotice, CartStorage, CartStore, InventoryError, InventoryService,
    MemoryStorage, Notifier, ProductInfo, StockInfo,
};
use sundial_core::ProductId;

// =============================================================================
// Test Doubles
// =============================================================================

/// Inventory double backed by fixed stock and catalog tables.
#[derive(Default)]
struct FakeInventory {
    stock: HashMap<ProductId, u32>,
    products: HashMap<ProductId, ProductInfo>,
    unreachable: bool,
}

impl FakeInventory {
    /// Build from `(id, name, price, stock)` rows.
    fn with(rows: &[(i32, &str, &str, u32)]) -> Self {
        let mut inventory = Self::default();
        for &(id, name, price, stock) in rows {
            let id = ProductId::new(id);
            inventory.stock.insert(id, stock);
            inventory.products.insert(
                id,
                ProductInfo {
                    id,
                    name: name.to_string(),
                    price: price.parse::<Decimal>().unwrap(),
                    image_url: format!("https://cdn.example.com/{id}.jpg"),
                },
            );
        }
        inventory
    }

    /// Inventory whose every call fails with a server error.
    fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl InventoryService for FakeInventory {
    async fn stock(&self, id: ProductId) -> Result<StockInfo, InventoryError> {
        if self.unreachable {
            return Err(InventoryError::Status(500));
        }
        self.stock
            .get(&id)
            .map(|&amount| StockInfo { id, amount })
            .ok_or_else(|| InventoryError::NotFound(format!("stock/{id}")))
    }

    async fn product(&self, id: ProductId) -> Result<ProductInfo, InventoryError> {
        if self.unreachable {
            return Err(InventoryError::Status(500));
        }
        self.products
            .get(&id)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(format!("products/{id}")))
    }
}

/// Notifier double that records every notice.
#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<CartNotice>>,
}

impl RecordingNotifier {
    fn take(&self) -> Vec<CartNotice> {
        std::mem::take(&mut self.notices.lock().unwrap())
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, notice: CartNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn store_with(
    inventory: FakeInventory,
) -> (CartStore, Arc<MemoryStorage>, Arc<RecordingNotifier>) {
    let storage = Arc::new(MemoryStorage::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let store = CartStore::open(Arc::new(inventory), storage.clone(), notifier.clone());
    (store, storage, notifier)
}

fn amounts(cart: &Cart) -> Vec<(i32, u32)> {
    cart.items()
        .iter()
        .map(|item| (item.id.as_i32(), item.amount))
        .collect()
}

/// Deserialize the persisted cart, failing the test if it is absent.
fn persisted(storage: &MemoryStorage) -> Cart {
    let serialized = storage.load(CART_STORAGE_KEY).unwrap().expect("cart persisted");
    serde_json::from_str(&serialized).expect("persisted cart parses")
}

// =============================================================================
// addProduct
// =============================================================================

#[tokio::test]
async fn add_with_zero_stock_leaves_cart_unchanged() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[(7, "Desert Boot", "89.90", 0)]));

    store.add_product(ProductId::new(7)).await;

    assert!(store.cart().await.is_empty());
    assert_eq!(notifier.take(), vec![CartNotice::OutOfStock]);
}

#[tokio::test]
async fn add_appends_new_item_with_amount_one() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[
        (1, "Trail Runner", "139.90", 5),
        (2, "Canvas Low", "59.90", 3),
    ]));

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(2)).await;

    let cart = store.cart().await;
    assert_eq!(amounts(&cart), vec![(1, 1), (2, 1)]);
    assert_eq!(cart.items()[0].name, "Trail Runner");
    assert_eq!(cart.items()[0].price.amount, Decimal::new(13990, 2));
    assert!(notifier.take().is_empty());
}

#[tokio::test]
async fn add_existing_item_increments_only_that_item() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[
        (1, "Trail Runner", "139.90", 5),
        (2, "Canvas Low", "59.90", 3),
    ]));

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(2)).await;
    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(1)).await;

    assert_eq!(amounts(&store.cart().await), vec![(1, 3), (2, 1)]);
    assert!(notifier.take().is_empty());
}

#[tokio::test]
async fn add_past_stock_level_is_rejected() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[(1, "Trail Runner", "139.90", 2)]));

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(1)).await;
    let before = store.cart().await;

    // Third unit would exceed the stock level of 2
    store.add_product(ProductId::new(1)).await;

    assert_eq!(store.cart().await, before);
    assert_eq!(amounts(&before), vec![(1, 2)]);
    assert_eq!(notifier.take(), vec![CartNotice::OutOfStock]);
}

#[tokio::test]
async fn add_unknown_product_reports_add_failed() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[(1, "Trail Runner", "139.90", 5)]));

    store.add_product(ProductId::new(42)).await;

    assert!(store.cart().await.is_empty());
    assert_eq!(notifier.take(), vec![CartNotice::AddFailed]);
}

#[tokio::test]
async fn add_with_inventory_unreachable_reports_add_failed() {
    let (store, _, notifier) = store_with(FakeInventory::unreachable());

    store.add_product(ProductId::new(1)).await;

    assert!(store.cart().await.is_empty());
    assert_eq!(notifier.take(), vec![CartNotice::AddFailed]);
}

// =============================================================================
// removeProduct
// =============================================================================

#[tokio::test]
async fn remove_present_item_removes_exactly_that_item() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[
        (1, "Trail Runner", "139.90", 5),
        (2, "Canvas Low", "59.90", 3),
        (3, "Desert Boot", "89.90", 4),
    ]));

    for id in [1, 2, 3] {
        store.add_product(ProductId::new(id)).await;
    }

    store.remove_product(ProductId::new(2)).await;

    assert_eq!(amounts(&store.cart().await), vec![(1, 1), (3, 1)]);
    assert!(notifier.take().is_empty());
}

#[tokio::test]
async fn remove_absent_item_reports_remove_failed() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[(1, "Trail Runner", "139.90", 5)]));

    store.add_product(ProductId::new(1)).await;
    store.remove_product(ProductId::new(9)).await;

    assert_eq!(amounts(&store.cart().await), vec![(1, 1)]);
    assert_eq!(notifier.take(), vec![CartNotice::RemoveFailed]);
}

// =============================================================================
// updateProductAmount
// =============================================================================

#[tokio::test]
async fn update_with_non_positive_amount_is_a_strict_noop() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[(1, "Trail Runner", "139.90", 5)]));

    store.add_product(ProductId::new(1)).await;
    let before = store.cart().await;

    store.update_product_amount(ProductId::new(1), 0).await;
    store.update_product_amount(ProductId::new(1), -3).await;

    assert_eq!(store.cart().await, before);
    assert!(notifier.take().is_empty());
}

#[tokio::test]
async fn update_sets_absolute_amount() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[
        (1, "Trail Runner", "139.90", 5),
        (2, "Canvas Low", "59.90", 3),
    ]));

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(2)).await;

    // Absolute replace, not additive
    store.update_product_amount(ProductId::new(1), 4).await;
    store.update_product_amount(ProductId::new(1), 2).await;

    assert_eq!(amounts(&store.cart().await), vec![(1, 2), (2, 1)]);
    assert!(notifier.take().is_empty());
}

#[tokio::test]
async fn update_absent_item_reports_update_failed() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[(1, "Trail Runner", "139.90", 5)]));

    store.update_product_amount(ProductId::new(1), 2).await;

    assert!(store.cart().await.is_empty());
    assert_eq!(notifier.take(), vec![CartNotice::UpdateFailed]);
}

#[tokio::test]
async fn update_past_stock_level_is_rejected() {
    let (store, _, notifier) = store_with(FakeInventory::with(&[(1, "Trail Runner", "139.90", 3)]));

    store.add_product(ProductId::new(1)).await;

    store.update_product_amount(ProductId::new(1), 4).await;

    assert_eq!(amounts(&store.cart().await), vec![(1, 1)]);
    assert_eq!(notifier.take(), vec![CartNotice::OutOfStock]);
}

#[tokio::test]
async fn update_with_inventory_unreachable_reports_update_failed() {
    let inventory = FakeInventory::with(&[(1, "Trail Runner", "139.90", 5)]);
    let (store, storage, notifier) = store_with(inventory);
    store.add_product(ProductId::new(1)).await;
    notifier.take();

    // Reopen the same storage against a dead inventory service
    let store = CartStore::open(
        Arc::new(FakeInventory::unreachable()),
        storage,
        notifier.clone(),
    );

    store.update_product_amount(ProductId::new(1), 2).await;

    assert_eq!(amounts(&store.cart().await), vec![(1, 1)]);
    assert_eq!(notifier.take(), vec![CartNotice::UpdateFailed]);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn every_successful_mutation_persists_the_full_cart() {
    let (store, storage, _) = store_with(FakeInventory::with(&[
        (1, "Trail Runner", "139.90", 5),
        (2, "Canvas Low", "59.90", 3),
    ]));

    store.add_product(ProductId::new(1)).await;
    assert_eq!(persisted(&storage), store.cart().await);

    store.add_product(ProductId::new(2)).await;
    store.update_product_amount(ProductId::new(2), 3).await;
    assert_eq!(persisted(&storage), store.cart().await);

    store.remove_product(ProductId::new(1)).await;
    assert_eq!(persisted(&storage), store.cart().await);
    assert_eq!(amounts(&persisted(&storage)), vec![(2, 3)]);
}

#[tokio::test]
async fn rejected_mutations_do_not_touch_storage() {
    let (store, storage, notifier) = store_with(FakeInventory::with(&[(7, "Desert Boot", "89.90", 0)]));

    store.add_product(ProductId::new(7)).await;

    assert!(storage.load(CART_STORAGE_KEY).unwrap().is_none());
    assert_eq!(notifier.take(), vec![CartNotice::OutOfStock]);
}

#[tokio::test]
async fn reopening_restores_the_persisted_cart() {
    let inventory = FakeInventory::with(&[(1, "Trail Runner", "139.90", 5)]);
    let (store, storage, notifier) = store_with(inventory);

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(1)).await;

    let reopened = CartStore::open(
        Arc::new(FakeInventory::with(&[(1, "Trail Runner", "139.90", 5)])),
        storage,
        notifier,
    );

    assert_eq!(amounts(&reopened.cart().await), vec![(1, 2)]);
}

#[tokio::test]
async fn malformed_persisted_data_yields_an_empty_cart() {
    let storage = Arc::new(MemoryStorage::new());
    storage.save(CART_STORAGE_KEY, "{definitely not json").unwrap();

    let store = CartStore::open(
        Arc::new(FakeInventory::default()),
        storage,
        Arc::new(RecordingNotifier::default()),
    );

    assert!(store.cart().await.is_empty());
}

// =============================================================================
// Change notifications
// =============================================================================

#[tokio::test]
async fn subscribers_observe_successful_mutations() {
    let (store, _, _) = store_with(FakeInventory::with(&[(1, "Trail Runner", "139.90", 5)]));
    let mut changes = store.subscribe();

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(1)).await;

    let first = changes.recv().await.unwrap();
    assert!(first.previous.is_empty());
    assert_eq!(amounts(&first.current), vec![(1, 1)]);

    let second = changes.recv().await.unwrap();
    assert_eq!(amounts(&second.previous), vec![(1, 1)]);
    assert_eq!(amounts(&second.current), vec![(1, 2)]);
}

#[tokio::test]
async fn rejected_mutations_emit_no_change() {
    let (store, _, _) = store_with(FakeInventory::with(&[(7, "Desert Boot", "89.90", 0)]));
    let mut changes = store.subscribe();

    store.add_product(ProductId::new(7)).await;
    store.remove_product(ProductId::new(7)).await;

    assert!(matches!(
        changes.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}
