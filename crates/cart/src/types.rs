//! Cart domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sundial_core::{CurrencyCode, Price, ProductId};

use crate::inventory::ProductInfo;

/// One product entry within the cart, carrying its own quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product id; unique within the cart.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Product image URL.
    pub image_url: String,
    /// Quantity held in the cart. At least 1 while the item is present.
    pub amount: u32,
}

impl LineItem {
    /// Price of the line as a whole (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount * Decimal::from(self.amount)
    }
}

impl From<ProductInfo> for LineItem {
    /// First-add line item from product metadata, with quantity 1.
    fn from(info: ProductInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            price: Price::new(info.price, CurrencyCode::default()),
            image_url: info.image_url,
            amount: 1,
        }
    }
}

/// The user's in-progress collection of selected products.
///
/// Insertion order is the order items were first added, and holds for the
/// lifetime of the cart. At most one line item exists per product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of line items (not quantities).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line item for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether a line item for `id` is present.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Total quantity across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.amount).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub(crate) fn get_mut(&mut self, id: ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub(crate) fn push(&mut self, item: LineItem) {
        self.items.push(item);
    }

    /// Remove the line item for `id`, keeping the relative order of the
    /// remainder. Returns whether an item was removed.
    pub(crate) fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() < before
    }
}
