//! REST client for the inventory service.
//!
//! Uses `reqwest` for HTTP. Product metadata is cached using `moka`
//! (5-minute TTL); stock levels are never cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use sundial_core::ProductId;

use crate::config::InventoryConfig;

use super::{InventoryError, InventoryService, ProductInfo, StockInfo};

const PRODUCT_CACHE_CAPACITY: u64 = 1_000;
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Client for the inventory REST API.
///
/// Serves `GET {base}/stock/{id}` and `GET {base}/products/{id}`.
/// Cheaply cloneable; all clones share one connection pool and one
/// metadata cache.
#[derive(Clone)]
pub struct HttpInventoryClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    timeout: Duration,
    products: Cache<ProductId, ProductInfo>,
}

impl HttpInventoryClient {
    /// Create a new inventory client from configuration.
    #[must_use]
    pub fn new(config: &InventoryConfig) -> Self {
        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                api_token: config
                    .api_token
                    .as_ref()
                    .map(|token| token.expose_secret().to_string()),
                timeout: config.timeout,
                products,
            }),
        }
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, InventoryError> {
        let url = format!("{}/{path}", self.inner.base_url);

        let mut request = self.inner.client.get(&url).timeout(self.inner.timeout);
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(path.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(InventoryError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "inventory service returned non-success status"
            );
            return Err(InventoryError::Status(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(200).collect::<String>(),
                "failed to parse inventory response"
            );
            InventoryError::Parse(e)
        })
    }
}

#[async_trait]
impl InventoryService for HttpInventoryClient {
    // Stock is ground truth at the moment of query; never cached.
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<StockInfo, InventoryError> {
        self.get_json(&format!("stock/{id}")).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<ProductInfo, InventoryError> {
        // Check cache
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: ProductInfo = self.get_json(&format!("products/{id}")).await?;

        // Cache the result
        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }
}
