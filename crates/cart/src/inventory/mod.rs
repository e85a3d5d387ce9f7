//! Inventory service port and REST client.
//!
//! The inventory service is the external, read-only source of truth for
//! stock levels and product metadata. Stock is ground truth at the moment
//! of query and is never cached; product metadata may be cached by
//! implementations.

mod http;

pub use http::HttpInventoryClient;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sundial_core::ProductId;

/// Maximum purchasable quantity for a product at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// Product id the stock level refers to.
    pub id: ProductId,
    /// Maximum purchasable quantity.
    pub amount: u32,
}

/// Product metadata as served by the inventory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    /// Product id.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price in the storefront currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Product image URL.
    pub image_url: String,
}

/// Errors that can occur when querying the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("inventory service returned HTTP {0}")]
    Status(u16),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the inventory service.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Read-only access to stock levels and product metadata.
///
/// The cart store consults this before committing any mutation that
/// increases quantity. All failure modes must surface as [`InventoryError`];
/// the store converts them to user-facing notices.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Stock level for a product.
    ///
    /// Treated as ground truth at the moment of query; callers must not
    /// reuse the result across mutations.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the service is
    /// unreachable.
    async fn stock(&self, id: ProductId) -> Result<StockInfo, InventoryError>;

    /// Product metadata for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the service is
    /// unreachable.
    async fn product(&self, id: ProductId) -> Result<ProductInfo, InventoryError>;
}
