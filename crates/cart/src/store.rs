//! The cart store.
//!
//! Holds the ordered cart in memory, validates mutations against the
//! inventory service, mirrors every successful mutation to storage, and
//! broadcasts change notifications to subscribers.
//!
//! Every mutation is atomic-in-effect: fully applied or fully rejected,
//! with no partial state visible to callers. Overlapping mutating calls
//! are serialized - each holds the store lock across its inventory
//! round-trip, so every mutation is evaluated against the latest committed
//! snapshot.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{instrument, warn};

use sundial_core::ProductId;

use crate::error::CartError;
use crate::inventory::InventoryService;
use crate::notify::{CartNotice, Notifier};
use crate::persist::{CART_STORAGE_KEY, CartStorage};
use crate::types::{Cart, LineItem};

/// Capacity of the change broadcast channel. Receivers that fall further
/// behind than this miss the oldest changes.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Snapshot pair emitted to subscribers after every successful mutation.
#[derive(Debug, Clone)]
pub struct CartChange {
    /// Cart contents before the mutation.
    pub previous: Cart,
    /// Cart contents after the mutation.
    pub current: Cart,
}

/// Client-side cart state container.
///
/// Construct one per session with [`CartStore::open`] and pass the handle
/// to whichever component needs it. All collaborators are injected; the
/// store never reaches for ambient state.
pub struct CartStore {
    inventory: Arc<dyn InventoryService>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
    cart: Mutex<Cart>,
    changes: broadcast::Sender<CartChange>,
}

impl CartStore {
    /// Create a store, restoring the cart persisted in `storage`.
    ///
    /// Missing stored data yields an empty cart. Malformed stored data also
    /// yields an empty cart and is reported in the logs rather than treated
    /// as an error.
    #[must_use]
    pub fn open(
        inventory: Arc<dyn InventoryService>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cart = restore(storage.as_ref());
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            inventory,
            storage,
            notifier,
            cart: Mutex::new(cart),
            changes,
        }
    }

    /// Current cart snapshot. No side effects.
    pub async fn cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    /// Subscribe to change notifications.
    ///
    /// Each successful mutation is delivered as a [`CartChange`]; rejected
    /// operations emit nothing.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartChange> {
        self.changes.subscribe()
    }

    /// Add one unit of `product_id` to the cart.
    ///
    /// Appends a new line item with quantity 1, or increments the existing
    /// item, subject to the stock level reported by the inventory service.
    /// Failures are surfaced as notices and leave the cart unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        let mut cart = self.cart.lock().await;

        match self.try_add(&cart, product_id).await {
            Ok(updated) => self.commit(&mut cart, updated),
            Err(e) => self.reject(&e, CartNotice::AddFailed),
        }
    }

    /// Remove the line item for `product_id` entirely.
    ///
    /// Targeting an id that is not in the cart surfaces a notice and leaves
    /// the cart unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) {
        let mut cart = self.cart.lock().await;

        let mut updated = cart.clone();
        if updated.remove(product_id) {
            self.commit(&mut cart, updated);
        } else {
            self.reject(
                &CartError::ItemNotFound(product_id),
                CartNotice::RemoveFailed,
            );
        }
    }

    /// Set the quantity of the line item for `product_id` to exactly
    /// `amount`.
    ///
    /// Amounts of zero or less are silently ignored; removal is a separate
    /// operation. Failures are surfaced as notices and leave the cart
    /// unchanged.
    #[instrument(skip(self), fields(product_id = %product_id, amount))]
    pub async fn update_product_amount(&self, product_id: ProductId, amount: i32) {
        if amount <= 0 {
            return;
        }

        let mut cart = self.cart.lock().await;

        match self.try_update(&cart, product_id, amount.unsigned_abs()).await {
            Ok(updated) => self.commit(&mut cart, updated),
            Err(e) => self.reject(&e, CartNotice::UpdateFailed),
        }
    }

    async fn try_add(&self, cart: &Cart, product_id: ProductId) -> Result<Cart, CartError> {
        let stock = self.inventory.stock(product_id).await?;
        if stock.amount == 0 {
            return Err(CartError::StockExhausted(product_id));
        }

        let mut updated = cart.clone();
        if let Some(item) = updated.get_mut(product_id) {
            let new_amount = item.amount.saturating_add(1);
            if new_amount > stock.amount {
                return Err(CartError::StockExhausted(product_id));
            }
            item.amount = new_amount;
        } else {
            let product = self.inventory.product(product_id).await?;
            updated.push(LineItem::from(product));
        }

        Ok(updated)
    }

    async fn try_update(
        &self,
        cart: &Cart,
        product_id: ProductId,
        amount: u32,
    ) -> Result<Cart, CartError> {
        let stock = self.inventory.stock(product_id).await?;

        let mut updated = cart.clone();
        let Some(item) = updated.get_mut(product_id) else {
            return Err(CartError::ItemNotFound(product_id));
        };

        if amount > stock.amount {
            return Err(CartError::StockExhausted(product_id));
        }

        item.amount = amount;
        Ok(updated)
    }

    /// Replace the in-memory cart, mirror it to storage, notify
    /// subscribers.
    ///
    /// The storage write is fire-and-forget: a failure is logged and the
    /// in-memory state is kept.
    fn commit(&self, cart: &mut Cart, updated: Cart) {
        let previous = std::mem::replace(cart, updated);

        match serde_json::to_string(&*cart) {
            Ok(serialized) => {
                if let Err(e) = self.storage.save(CART_STORAGE_KEY, &serialized) {
                    warn!(error = %e, "failed to persist cart");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize cart"),
        }

        let _ = self.changes.send(CartChange {
            previous,
            current: cart.clone(),
        });
    }

    /// Map a rejected mutation to its user-facing notice.
    fn reject(&self, error: &CartError, fallback: CartNotice) {
        let notice = match error {
            CartError::StockExhausted(_) => CartNotice::OutOfStock,
            CartError::ItemNotFound(_) | CartError::Inventory(_) => fallback,
        };

        warn!(error = %error, "cart mutation rejected");
        self.notifier.error(notice);
    }
}

/// Read the persisted cart, tolerating absence and malformed data.
fn restore(storage: &dyn CartStorage) -> Cart {
    match storage.load(CART_STORAGE_KEY) {
        Ok(Some(serialized)) => match serde_json::from_str(&serialized) {
            Ok(cart) => cart,
            Err(e) => {
                warn!(error = %e, "persisted cart is malformed, starting empty");
                Cart::default()
            }
        },
        Ok(None) => Cart::default(),
        Err(e) => {
            warn!(error = %e, "failed to read persisted cart, starting empty");
            Cart::default()
        }
    }
}
