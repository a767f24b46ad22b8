//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::delivery::DeliverySelector;
use crate::platform::{CustomerClient, LiveStoreClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to shared
/// resources: the platform API clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    live_store: LiveStoreClient,
    customers: CustomerClient,
    delivery: DeliverySelector,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let live_store = LiveStoreClient::new(&config.api_url);
        let customers = CustomerClient::new(&config.api_url);
        let delivery = DeliverySelector::new(&config.content_origin);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                live_store,
                customers,
                delivery,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the live storefront payload client.
    #[must_use]
    pub fn live_store(&self) -> &LiveStoreClient {
        &self.inner.live_store
    }

    /// Get a reference to the customer account client.
    #[must_use]
    pub fn customers(&self) -> &CustomerClient {
        &self.inner.customers
    }

    /// Get a reference to the delivery selector.
    #[must_use]
    pub fn delivery(&self) -> &DeliverySelector {
        &self.inner.delivery
    }
}
