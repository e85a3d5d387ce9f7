//! Error taxonomy for cart mutations.
//!
//! Every mutating operation fully contains its own failures: the store maps
//! these errors to user-facing notices at the operation boundary and leaves
//! state untouched. None propagate to callers, none are retried, none are
//! fatal.

use thiserror::Error;

use sundial_core::ProductId;

use crate::inventory::InventoryError;

/// Errors raised while applying a cart mutation.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds the available stock level.
    #[error("requested quantity for product {0} exceeds available stock")]
    StockExhausted(ProductId),

    /// Operation targets a line item that is not in the cart.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),

    /// Inventory service call failed.
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::StockExhausted(ProductId::new(3));
        assert_eq!(
            err.to_string(),
            "requested quantity for product 3 exceeds available stock"
        );

        let err = CartError::ItemNotFound(ProductId::new(9));
        assert_eq!(err.to_string(), "product 9 is not in the cart");
    }
}
