//! Live storefront payload client.
//!
//! `GET {api}/s/live/{slug}` returns everything needed to render a store in
//! one round trip: the store profile, its assigned theme (if any), and the
//! first page of products and categories.

use std::sync::Arc;
use std::time::Duration;

use kiosk_core::{StoreSlug, TenantId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{PlatformError, snippet};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the public live storefront endpoint.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct LiveStoreClient {
    inner: Arc<LiveStoreClientInner>,
}

struct LiveStoreClientInner {
    client: reqwest::Client,
    api_base: String,
}

impl LiveStoreClient {
    /// Create a client for the given API base URL (version prefix included).
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(LiveStoreClientInner {
                client: reqwest::Client::new(),
                api_base,
            }),
        }
    }

    /// Fetch the live payload for a store.
    ///
    /// # Errors
    ///
    /// `PlatformError::NotFound` when the store does not exist or is not
    /// live; other variants for transport, status, and payload problems.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn fetch(&self, slug: &StoreSlug) -> Result<LiveStore, PlatformError> {
        let url = format!("{}/s/live/{}", self.inner.api_base, slug);
        let response = self
            .inner
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(slug.to_string()));
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(PlatformError::Status {
                status,
                snippet: snippet(&text),
            });
        }

        let envelope: LiveEnvelope = serde_json::from_str(&text)?;
        let live = envelope
            .data
            .ok_or_else(|| PlatformError::MissingData(format!("live payload for {slug}")))?;
        debug!(
            store_id = %live.store.id,
            products = live.products.len(),
            categories = live.categories.len(),
            "fetched live storefront payload"
        );
        Ok(live)
    }

    /// Whether the platform API answers at all.
    ///
    /// Any HTTP response counts as reachable; only transport failures do not.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/health", self.inner.api_base);
        self.inner
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }
}

impl std::fmt::Debug for LiveStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveStoreClient")
            .field("api_base", &self.inner.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct LiveEnvelope {
    #[serde(default)]
    #[allow(dead_code)]
    success: bool,
    #[serde(default)]
    data: Option<LiveStore>,
}

/// Everything needed to render one store.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveStore {
    pub store: StoreProfile,
    #[serde(default)]
    pub theme: Option<ThemeSummary>,
    #[serde(default)]
    pub products: Vec<ProductSummary>,
    #[serde(default)]
    pub categories: Vec<CategorySummary>,
    #[serde(rename = "totalProducts", default)]
    pub total_products: u64,
    #[serde(rename = "totalCategories", default)]
    pub total_categories: u64,
}

/// Public profile of a store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreProfile {
    /// Canonical tenant id; every customer-facing API call for this store
    /// carries it.
    pub id: TenantId,
    pub name: String,
    pub slug: StoreSlug,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(rename = "logoUrl", default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Theme assigned to a store.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Theme slug; selects both the uploads directory probed for a static
    /// export and the built-in template used as fallback.
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "thumbnailUrl", default)]
    pub thumbnail_url: Option<String>,
}

/// One product in the live payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(rename = "compareAtPrice", default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(rename = "inventoryQuantity", default)]
    pub inventory_quantity: i64,
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<String>,
}

/// One category in the live payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload_parses() {
        let json = r#"{
            "success": true,
            "data": {
                "store": {
                    "id": "t_123",
                    "name": "Acme Gadgets",
                    "slug": "acme",
                    "tagline": "Everything beeps",
                    "logoUrl": "https://cdn.example/acme.png"
                },
                "theme": {
                    "id": "th_9",
                    "name": "Electronics",
                    "slug": "electronics",
                    "thumbnailUrl": null
                },
                "products": [
                    {
                        "id": "p_1",
                        "name": "Widget",
                        "price": 19.99,
                        "compareAtPrice": 24.99,
                        "images": ["https://cdn.example/widget.jpg"],
                        "inventoryQuantity": 5,
                        "categoryId": "c_1"
                    }
                ],
                "categories": [
                    {"id": "c_1", "name": "Gadgets"}
                ],
                "totalProducts": 1,
                "totalCategories": 1
            }
        }"#;

        let envelope: LiveEnvelope = serde_json::from_str(json).unwrap();
        let live = envelope.data.unwrap();
        assert_eq!(live.store.id.as_str(), "t_123");
        assert_eq!(live.store.slug.as_str(), "acme");
        assert_eq!(live.theme.as_ref().unwrap().slug, "electronics");
        assert_eq!(live.products.len(), 1);
        assert_eq!(live.products[0].price, Decimal::new(1999, 2));
        assert_eq!(
            live.products[0].compare_at_price,
            Some(Decimal::new(2499, 2))
        );
        assert_eq!(live.total_products, 1);
    }

    #[test]
    fn test_minimal_payload_fills_defaults() {
        let json = r#"{
            "success": true,
            "data": {
                "store": {"id": "t_9", "name": "Bare", "slug": "bare"}
            }
        }"#;

        let envelope: LiveEnvelope = serde_json::from_str(json).unwrap();
        let live = envelope.data.unwrap();
        assert!(live.theme.is_none());
        assert!(live.products.is_empty());
        assert!(live.categories.is_empty());
        assert_eq!(live.total_products, 0);
    }

    #[test]
    fn test_missing_data_is_detectable() {
        let json = r#"{"success": false}"#;
        let envelope: LiveEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_integer_price_parses() {
        let json = r#"{"id": "p_2", "name": "Round", "price": 42}"#;
        let product: ProductSummary = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Decimal::new(42, 0));
        assert!(product.compare_at_price.is_none());
    }
}
