//! Sundial Cart - client-side shopping cart state management.
//!
//! # Architecture
//!
//! - [`store::CartStore`] is the single owner of cart state. It holds the
//!   ordered line items in memory, mirrors them to durable storage after
//!   every successful mutation, and broadcasts change notifications to
//!   subscribers.
//! - The inventory service is the authoritative source for stock levels and
//!   product metadata. The store consults it before committing any mutation
//!   that increases quantity.
//! - External collaborators are injected as ports: [`inventory::InventoryService`]
//!   (read-only HTTP), [`persist::CartStorage`] (synchronous key-value
//!   strings), and [`notify::Notifier`] (one-way user notices).
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sundial_cart::{CartConfig, CartStore, FileStorage, HttpInventoryClient, TracingNotifier};
//! use sundial_core::ProductId;
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::open(
//!     Arc::new(HttpInventoryClient::new(&config.inventory)),
//!     Arc::new(FileStorage::new(config.storage_dir)),
//!     Arc::new(TracingNotifier),
//! );
//!
//! store.add_product(ProductId::new(7)).await;
//! let cart = store.cart().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod inventory;
pub mod notify;
pub mod persist;
pub mod store;
pub mod types;

pub use config::{CartConfig, ConfigError, InventoryConfig};
pub use error::CartError;
pub use inventory::{
    HttpInventoryClient, InventoryError, InventoryService, ProductInfo, StockInfo,
};
pub use notify::{CartNotice, Notifier, TracingNotifier};
pub use persist::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartChange, CartStore};
pub use types::{Cart, LineItem};
