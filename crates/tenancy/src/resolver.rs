//! Tenant identity resolution.
//!
//! Runs the source priority chain described in the crate docs. Slug lookups
//! go through a shared cache with request coalescing, so a burst of requests
//! for a cold slug produces exactly one platform call.

use core::fmt;
use std::sync::Arc;
use std::time::Duration;

use kiosk_core::{StoreSlug, TenantId, TenantRecord};
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::claims::decode_claims;
use crate::context::{RequestContext, SessionContext};
use crate::error::TenancyError;

const SLUG_CACHE_CAPACITY: u64 = 10_000;
const STORE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a resolved tenant id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantSource {
    /// Navigation slug verified against the platform.
    Slug,
    /// Session profile.
    Profile,
    /// Claims decoded from the bearer credential.
    Claims,
    /// Manual operator override.
    Override,
}

impl fmt::Display for TenantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slug => write!(f, "slug"),
            Self::Profile => write!(f, "profile"),
            Self::Claims => write!(f, "claims"),
            Self::Override => write!(f, "override"),
        }
    }
}

/// What one resolution source had to say.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    /// The source consulted.
    pub source: TenantSource,
    /// Human-readable outcome, e.g. `resolved t_123` or `absent`.
    pub outcome: String,
}

/// Per-source trace of a resolution attempt.
///
/// Attached to [`TenancyError::TenantUnresolved`] and printed by the CLI
/// `sources` command. Never shown to storefront visitors.
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    /// Outcomes in consultation order.
    pub outcomes: Vec<SourceOutcome>,
}

impl ResolutionReport {
    fn record(&mut self, source: TenantSource, outcome: impl Into<String>) {
        self.outcomes.push(SourceOutcome {
            source,
            outcome: outcome.into(),
        });
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.outcomes.is_empty() {
            return write!(f, "(no sources consulted)");
        }
        let mut first = true;
        for entry in &self.outcomes {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", entry.source, entry.outcome)?;
            first = false;
        }
        Ok(())
    }
}

/// Resolves which tenant a request belongs to.
///
/// Cheap to clone; clones share the HTTP client and the slug cache.
#[derive(Clone)]
pub struct TenantResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    client: reqwest::Client,
    api_base: String,
    slug_cache: Cache<StoreSlug, TenantId>,
}

impl TenantResolver {
    /// Create a resolver talking to the given platform API base URL
    /// (e.g. `http://127.0.0.1:8000/api/v1`, no trailing slash).
    ///
    /// Slug mappings are stable for the life of a store, so the cache has no
    /// expiry; [`invalidate_slug`](Self::invalidate_slug) is the only way an
    /// entry leaves early.
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        let slug_cache = Cache::builder().max_capacity(SLUG_CACHE_CAPACITY).build();

        Self {
            inner: Arc::new(ResolverInner {
                client: reqwest::Client::new(),
                api_base: api_base.into(),
                slug_cache,
            }),
        }
    }

    /// Resolve the tenant for this request, trying sources in priority
    /// order and stopping at the first hit.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyError::TenantUnresolved`] when every source has been
    /// consulted without producing a tenant. Source-internal failures (slug
    /// lookup transport errors, undecodable claims) never error; they are
    /// logged and the chain moves on.
    #[instrument(skip(self, ctx, nav), fields(path = ?nav.path, host = ?nav.host))]
    pub async fn resolve(
        &self,
        ctx: &SessionContext,
        nav: &RequestContext,
    ) -> Result<TenantId, TenancyError> {
        let mut report = ResolutionReport::default();

        if let Some((source, id)) = self.consult_chain(ctx, nav, &mut report).await {
            debug!(tenant = %id, %source, "tenant resolved");
            return Ok(id);
        }

        warn!(%report, "tenant resolution exhausted every source");
        Err(TenancyError::TenantUnresolved(Box::new(report)))
    }

    /// Evaluate every source regardless of hits, for diagnostics.
    ///
    /// Unlike [`resolve`](Self::resolve) this does not short-circuit: the
    /// returned report shows what each source would contribute, and the
    /// returned tenant (if any) is the one the priority chain would pick.
    pub async fn survey(
        &self,
        ctx: &SessionContext,
        nav: &RequestContext,
    ) -> (Option<TenantId>, ResolutionReport) {
        let mut report = ResolutionReport::default();
        let mut chosen: Option<TenantId> = None;

        if let Some(slug) = nav.slug() {
            match self.lookup_slug(&slug).await {
                Ok(id) => {
                    report.record(TenantSource::Slug, format!("{slug} resolved to {id}"));
                    chosen.get_or_insert(id);
                }
                Err(err) => report.record(TenantSource::Slug, format!("{slug}: {err}")),
            }
        } else {
            report.record(TenantSource::Slug, "no navigation slug");
        }

        if let Some(id) = Self::consult_profile(ctx, &mut report) {
            chosen.get_or_insert(id);
        }
        if let Some(id) = Self::consult_claims(ctx, &mut report) {
            chosen.get_or_insert(id);
        }
        if let Some(id) = Self::consult_overrides(ctx, &mut report) {
            chosen.get_or_insert(id);
        }

        (chosen, report)
    }

    /// Look a slug up directly, going through the shared cache.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyError::SlugNotFound`] for a definite platform miss
    /// and [`TenancyError::Lookup`] for transport or payload failures.
    /// Failures are never cached; the next call retries the platform.
    pub async fn lookup_slug(&self, slug: &StoreSlug) -> Result<TenantId, TenancyError> {
        self.inner
            .slug_cache
            .try_get_with(slug.clone(), self.fetch_store_check(slug))
            .await
            .map_err(|err: Arc<TenancyError>| match err.as_ref() {
                TenancyError::SlugNotFound(slug) => TenancyError::SlugNotFound(slug.clone()),
                other => TenancyError::Lookup(other.to_string()),
            })
    }

    /// Drop the cached mapping for a slug, forcing the next resolution to
    /// ask the platform again.
    pub async fn invalidate_slug(&self, slug: &StoreSlug) {
        self.inner.slug_cache.invalidate(slug).await;
    }

    async fn consult_chain(
        &self,
        ctx: &SessionContext,
        nav: &RequestContext,
        report: &mut ResolutionReport,
    ) -> Option<(TenantSource, TenantId)> {
        if let Some(slug) = nav.slug() {
            match self.lookup_slug(&slug).await {
                Ok(id) => return Some((TenantSource::Slug, id)),
                Err(err) => {
                    debug!(%slug, error = %err, "slug lookup failed, falling through");
                    report.record(TenantSource::Slug, format!("{slug}: {err}"));
                }
            }
        } else {
            report.record(TenantSource::Slug, "no navigation slug");
        }

        if let Some(id) = Self::consult_profile(ctx, report) {
            return Some((TenantSource::Profile, id));
        }
        if let Some(id) = Self::consult_claims(ctx, report) {
            return Some((TenantSource::Claims, id));
        }
        if let Some(id) = Self::consult_overrides(ctx, report) {
            return Some((TenantSource::Override, id));
        }

        None
    }

    fn consult_profile(ctx: &SessionContext, report: &mut ResolutionReport) -> Option<TenantId> {
        match &ctx.profile {
            Some(profile) => match profile.tenant() {
                Some(id) => {
                    report.record(TenantSource::Profile, format!("resolved {id}"));
                    Some(id)
                }
                None => {
                    report.record(TenantSource::Profile, "present but carries no store");
                    None
                }
            },
            None => {
                report.record(TenantSource::Profile, "absent");
                None
            }
        }
    }

    fn consult_claims(ctx: &SessionContext, report: &mut ResolutionReport) -> Option<TenantId> {
        let Some(credential) = &ctx.credential else {
            report.record(TenantSource::Claims, "no credential");
            return None;
        };

        match decode_claims(credential.expose_secret()) {
            Some(claims) => match claims.tenant() {
                Some(id) => {
                    report.record(TenantSource::Claims, format!("resolved {id}"));
                    Some(id)
                }
                None => {
                    report.record(TenantSource::Claims, "decoded but carry no store");
                    None
                }
            },
            None => {
                report.record(TenantSource::Claims, "credential is not a decodable token");
                None
            }
        }
    }

    fn consult_overrides(ctx: &SessionContext, report: &mut ResolutionReport) -> Option<TenantId> {
        match ctx.overrides.first_match() {
            Some((scope, key, id)) => {
                report.record(
                    TenantSource::Override,
                    format!("resolved {id} from {scope} {key}"),
                );
                Some(id)
            }
            None => {
                report.record(
                    TenantSource::Override,
                    format!("no match among {} entries", ctx.overrides.len()),
                );
                None
            }
        }
    }

    async fn fetch_store_check(&self, slug: &StoreSlug) -> Result<TenantId, TenancyError> {
        let url = format!("{}/store/store-check/{slug}", self.inner.api_base);
        debug!(%slug, "verifying slug against the platform");

        let response = self
            .inner
            .client
            .get(&url)
            .timeout(STORE_CHECK_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TenancyError::SlugNotFound(slug.clone()));
        }
        if !status.is_success() {
            return Err(TenancyError::Status {
                status,
                snippet: text.chars().take(200).collect(),
            });
        }

        let envelope: StoreCheckEnvelope = serde_json::from_str(&text)?;
        envelope
            .data
            .and_then(|data| data.store)
            .and_then(|store| store.normalize())
            .ok_or_else(|| TenancyError::Lookup(format!("store-check for {slug} carried no id")))
    }
}

impl fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantResolver")
            .field("api_base", &self.inner.api_base)
            .field("cached_slugs", &self.inner.slug_cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct StoreCheckEnvelope {
    #[serde(default)]
    data: Option<StoreCheckData>,
}

#[derive(Debug, Deserialize)]
struct StoreCheckData {
    #[serde(default)]
    store: Option<TenantRecord>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::OverrideStore;

    fn resolver() -> TenantResolver {
        // Unroutable base: any slug lookup in these tests would be a bug.
        TenantResolver::new("http://127.0.0.1:1/api/v1")
    }

    #[tokio::test]
    async fn test_profile_resolves_without_network() {
        let ctx = SessionContext::anonymous().with_profile(crate::SessionProfile {
            store_id: Some(kiosk_core::TenantRef::Id("t_profile".to_owned())),
            ..Default::default()
        });

        let id = resolver()
            .resolve(&ctx, &RequestContext::detached())
            .await
            .unwrap();
        assert_eq!(id.as_str(), "t_profile");
    }

    #[tokio::test]
    async fn test_unresolved_report_lists_every_source() {
        let err = resolver()
            .resolve(&SessionContext::anonymous(), &RequestContext::detached())
            .await
            .unwrap_err();

        let report = err.resolution_report().unwrap();
        let sources: Vec<TenantSource> = report.outcomes.iter().map(|o| o.source).collect();
        assert_eq!(
            sources,
            vec![
                TenantSource::Slug,
                TenantSource::Profile,
                TenantSource::Claims,
                TenantSource::Override,
            ]
        );
    }

    #[tokio::test]
    async fn test_override_is_last_resort() {
        let mut overrides = OverrideStore::default();
        overrides.set_session("store_id", "t_override");

        let ctx = SessionContext {
            overrides,
            ..SessionContext::anonymous()
        };

        let id = resolver()
            .resolve(&ctx, &RequestContext::detached())
            .await
            .unwrap();
        assert_eq!(id.as_str(), "t_override");
    }

    #[test]
    fn test_report_display_reads_as_one_line() {
        let mut report = ResolutionReport::default();
        report.record(TenantSource::Slug, "no navigation slug");
        report.record(TenantSource::Profile, "absent");
        assert_eq!(
            report.to_string(),
            "slug: no navigation slug; profile: absent"
        );
    }
}
