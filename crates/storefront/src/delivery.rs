//! Storefront delivery selection.
//!
//! A store with a theme is served one of two ways: an uploaded static export
//! of the theme, embedded in an iframe, or a built-in server-rendered
//! template. The selector probes the upload locations for the store's theme
//! and picks the first that answers; when none does, the built-in template
//! takes over. A store with no theme renders an empty storefront page.

use std::sync::Arc;
use std::time::Duration;

use kiosk_core::{StoreSlug, TenantId};
use tracing::{debug, instrument};

use crate::platform::LiveStore;

/// Per-candidate probe timeout. A slow uploads host must not stall page
/// delivery indefinitely.
pub const DELIVERY_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// How a store's front page is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Embed the uploaded static export found at `url`.
    EmbeddedExport { url: String },
    /// Render the built-in template for `theme_slug`.
    NativeTemplate { theme_slug: String },
    /// Store has no theme assigned.
    Empty,
}

/// Resolved delivery decision for one store.
#[derive(Debug, Clone)]
pub struct StorefrontContext {
    pub tenant_id: TenantId,
    pub theme_slug: Option<String>,
    pub mode: DeliveryMode,
}

/// Result of probing one candidate location.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub candidate_url: String,
    pub reachable: bool,
}

/// Decides how to deliver a storefront.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct DeliverySelector {
    inner: Arc<DeliverySelectorInner>,
}

struct DeliverySelectorInner {
    client: reqwest::Client,
    content_origin: String,
}

impl DeliverySelector {
    /// Create a selector probing the given content origin.
    #[must_use]
    pub fn new(content_origin: impl Into<String>) -> Self {
        let content_origin = content_origin.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(DeliverySelectorInner {
                client: reqwest::Client::new(),
                content_origin,
            }),
        }
    }

    /// Candidate export locations for a theme, most specific first.
    ///
    /// Theme builds upload to `out/index.html`; hand-uploaded exports land at
    /// the directory root. The first candidate that answers wins, so the
    /// build output shadows a stale root upload.
    #[must_use]
    pub fn candidate_urls(&self, theme_slug: &str) -> [String; 2] {
        let origin = &self.inner.content_origin;
        [
            format!("{origin}/uploads/themes/{theme_slug}/out/index.html"),
            format!("{origin}/uploads/themes/{theme_slug}/index.html"),
        ]
    }

    /// Decide the delivery mode for a live store payload.
    #[instrument(skip(self, live), fields(store = %live.store.slug))]
    pub async fn select(&self, live: &LiveStore) -> StorefrontContext {
        let tenant_id = live.store.id.clone();
        let Some(theme) = &live.theme else {
            debug!("store has no theme, delivering empty storefront");
            return StorefrontContext {
                tenant_id,
                theme_slug: None,
                mode: DeliveryMode::Empty,
            };
        };

        let mode = self.select_for_theme(&theme.slug, &live.store.slug).await;
        StorefrontContext {
            tenant_id,
            theme_slug: Some(theme.slug.clone()),
            mode,
        }
    }

    /// Probe candidates in order; first reachable export wins and later
    /// candidates are never probed. Probes run one at a time so the priority
    /// order stays deterministic under slow hosts.
    pub async fn select_for_theme(&self, theme_slug: &str, store_slug: &StoreSlug) -> DeliveryMode {
        for candidate in self.candidate_urls(theme_slug) {
            let outcome = self.probe(&candidate).await;
            if outcome.reachable {
                debug!(url = %candidate, "serving uploaded theme export");
                return DeliveryMode::EmbeddedExport {
                    url: format!("{candidate}?store={store_slug}"),
                };
            }
        }
        debug!(theme = theme_slug, "no export reachable, using built-in template");
        DeliveryMode::NativeTemplate {
            theme_slug: theme_slug.to_string(),
        }
    }

    /// HEAD one candidate. Timeouts and transport errors count as
    /// unreachable; they only ever skip a candidate, never fail the page.
    pub async fn probe(&self, candidate_url: &str) -> ProbeOutcome {
        let request = self.inner.client.head(candidate_url).send();
        let reachable = match tokio::time::timeout(DELIVERY_PROBE_TIMEOUT, request).await {
            Ok(Ok(response)) => response.status().is_success(),
            Ok(Err(err)) => {
                debug!(url = candidate_url, error = %err, "probe failed");
                false
            }
            Err(_) => {
                debug!(url = candidate_url, "probe timed out");
                false
            }
        };
        ProbeOutcome {
            candidate_url: candidate_url.to_string(),
            reachable,
        }
    }

    /// Probe every candidate for a theme, in priority order, without the
    /// first-hit short-circuit. Diagnostic use only.
    pub async fn probe_report(&self, theme_slug: &str) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::new();
        for candidate in self.candidate_urls(theme_slug) {
            outcomes.push(self.probe(&candidate).await);
        }
        outcomes
    }
}

impl std::fmt::Debug for DeliverySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliverySelector")
            .field("content_origin", &self.inner.content_origin)
            .finish_non_exhaustive()
    }
}
