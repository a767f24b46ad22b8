//! Integration tests for Kiosk.
//!
//! Each test spawns the full storefront router on an ephemeral port, with a
//! wiremock server standing in for the platform API. The content origin is
//! derived from the API URL, so the same mock also plays the uploads host
//! that delivery probes hit.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kiosk-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use kiosk_storefront::config::{SentryConfig, StorefrontConfig};
use kiosk_storefront::routes;
use kiosk_storefront::state::AppState;
use serde_json::{Value, json};
use wiremock::MockServer;

/// A running storefront wired to a mock platform API.
pub struct TestApp {
    /// Base URL of the spawned storefront, e.g. `http://127.0.0.1:49213`.
    pub address: String,
    /// The mock platform API; mount expectations here.
    pub api: MockServer,
}

impl TestApp {
    /// Absolute URL for a path on the spawned storefront.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }
}

/// Spawn the storefront against a fresh mock platform API.
///
/// # Panics
///
/// Panics when no ephemeral port can be bound.
pub async fn spawn_app() -> TestApp {
    let api = MockServer::start().await;

    let config = StorefrontConfig {
        api_url: api.uri(),
        content_origin: api.uri(),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost".to_string(),
        sentry: SentryConfig {
            dsn: None,
            environment: "test".to_string(),
            sample_rate: 0.0,
            traces_sample_rate: 0.0,
        },
    };

    let router = routes::app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind an ephemeral port");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("listener has no address")
    );

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("storefront server stopped");
    });

    TestApp { address, api }
}

/// HTTP client behaving like a browser: cookie store on, redirects manual so
/// tests can assert on them.
///
/// # Panics
///
/// Panics when the client cannot be constructed.
#[must_use]
pub fn browser_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Canned live-store payload in the platform's envelope shape.
///
/// `theme_slug: None` produces a store with no theme assigned.
#[must_use]
pub fn live_store_body(tenant_id: &str, slug: &str, theme_slug: Option<&str>) -> Value {
    let theme = theme_slug.map(|theme| json!({"name": "Test Theme", "slug": theme}));
    json!({
        "success": true,
        "data": {
            "store": {
                "id": tenant_id,
                "name": "Acme Gadgets",
                "slug": slug,
                "tagline": "Everything beeps",
            },
            "theme": theme,
            "products": [
                {
                    "id": "p_1",
                    "name": "Widget",
                    "price": 19.99,
                    "compareAtPrice": 24.99,
                    "inventoryQuantity": 3,
                },
                {
                    "id": "p_2",
                    "name": "Gizmo",
                    "price": 5.5,
                    "inventoryQuantity": 0,
                },
            ],
            "categories": [{"id": "c_1", "name": "Gadgets"}],
            "totalProducts": 2,
            "totalCategories": 1,
        }
    })
}

/// Canned customer auth success payload.
#[must_use]
pub fn customer_auth_body(token: &str, name: &str, email: &str) -> Value {
    json!({
        "success": true,
        "token": token,
        "customer": {"id": "cust_1", "name": name, "email": email},
    })
}
