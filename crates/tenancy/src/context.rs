//! Ambient context consulted during tenant resolution.
//!
//! Resolution never reaches into globals. Whatever the caller knows about
//! the session (credential, profile, operator overrides) is packed into a
//! [`SessionContext`], and whatever the current navigation knows (path,
//! host) into a [`RequestContext`]. Both are plain data, which is what makes
//! the priority chain unit-testable.

use core::fmt;
use std::collections::HashMap;
use std::sync::LazyLock;

use kiosk_core::{StoreSlug, TenantId, TenantRef};
use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Override keys recognized by the resolver, in priority order.
///
/// Operators and older tooling stash a chosen store under a handful of
/// legacy names; all of them stay honored. Within one scope the first key
/// holding a non-empty value wins.
pub const OVERRIDE_KEYS: [&str; 5] = [
    "admin.store_id",
    "store_id",
    "current_store_id",
    "selected_store_id",
    "merchant.store_id",
];

/// Everything the session knows that could identify a tenant.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Bearer credential for platform calls. Also the claims source.
    pub credential: Option<SecretString>,
    /// Authenticated profile, more authoritative than decoded claims.
    pub profile: Option<SessionProfile>,
    /// Manual store overrides.
    pub overrides: OverrideStore,
}

impl SessionContext {
    /// A context with no credential, profile, or overrides.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Attach a bearer credential.
    #[must_use]
    pub fn with_credential(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(SecretString::from(token.into()));
        self
    }

    /// Attach an authenticated profile.
    #[must_use]
    pub fn with_profile(mut self, profile: SessionProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Authenticated account profile as the platform serializes it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionProfile {
    /// Account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Account email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Direct store reference.
    #[serde(rename = "storeId", default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<TenantRef>,
    /// Store memberships, first entry is the default store.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stores: Vec<TenantRef>,
}

impl SessionProfile {
    /// The store this profile points at: `storeId` first, then the first
    /// normalizable membership entry.
    #[must_use]
    pub fn tenant(&self) -> Option<TenantId> {
        self.store_id
            .as_ref()
            .and_then(TenantRef::normalize)
            .or_else(|| self.stores.iter().find_map(TenantRef::normalize))
    }
}

/// Which override scope a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideScope {
    /// Survives restarts (browser-era `localStorage`).
    Persistent,
    /// Lives for one session (browser-era `sessionStorage`).
    Session,
}

impl fmt::Display for OverrideScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistent => write!(f, "persistent"),
            Self::Session => write!(f, "session"),
        }
    }
}

/// Two-scope key/value store for manual store overrides.
///
/// The persistent scope is scanned before the session scope, and within a
/// scope keys are scanned in [`OVERRIDE_KEYS`] order. Empty values are
/// skipped, not treated as matches.
#[derive(Debug, Clone, Default)]
pub struct OverrideStore {
    persistent: HashMap<String, String>,
    session: HashMap<String, String>,
}

impl OverrideStore {
    /// Set a value in the persistent scope.
    pub fn set_persistent(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.persistent.insert(key.into(), value.into());
    }

    /// Set a value in the session scope.
    pub fn set_session(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.session.insert(key.into(), value.into());
    }

    /// Remove a key from both scopes.
    pub fn clear(&mut self, key: &str) {
        self.persistent.remove(key);
        self.session.remove(key);
    }

    /// True when neither scope holds any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persistent.is_empty() && self.session.is_empty()
    }

    /// Total number of entries across both scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.persistent.len() + self.session.len()
    }

    /// First override that parses into a tenant id, with its provenance.
    #[must_use]
    pub fn first_match(&self) -> Option<(OverrideScope, &'static str, TenantId)> {
        Self::scan(&self.persistent)
            .map(|(key, id)| (OverrideScope::Persistent, key, id))
            .or_else(|| {
                Self::scan(&self.session).map(|(key, id)| (OverrideScope::Session, key, id))
            })
    }

    fn scan(scope: &HashMap<String, String>) -> Option<(&'static str, TenantId)> {
        OVERRIDE_KEYS.iter().find_map(|key| {
            scope
                .get(*key)
                .and_then(|raw| TenantId::parse(raw).ok())
                .map(|id| (*key, id))
        })
    }
}

/// What the current navigation knows about itself.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Request path, e.g. `/manager/acme/products`.
    pub path: Option<String>,
    /// Request host, with or without a port.
    pub host: Option<String>,
}

/// Manager URLs embed the slug as the segment after `/manager/`; the
/// trailing slash is part of the contract, so `/manager/acme` alone does not
/// carry a slug.
static MANAGER_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/manager/([^/]+)/").expect("Invalid regex"));

impl RequestContext {
    /// A context carrying only a request path.
    #[must_use]
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            host: None,
        }
    }

    /// A context carrying only a host.
    #[must_use]
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            path: None,
            host: Some(host.into()),
        }
    }

    /// A context with neither path nor host (nothing slug-derived applies).
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// The navigation slug, if the path or host carries one.
    ///
    /// Path wins over host. Extracted segments are percent-decoded before
    /// validation; anything that fails validation is treated as "no slug".
    #[must_use]
    pub fn slug(&self) -> Option<StoreSlug> {
        self.slug_from_path().or_else(|| self.slug_from_host())
    }

    fn slug_from_path(&self) -> Option<StoreSlug> {
        let path = self.path.as_deref()?;
        let captured = MANAGER_PATH_RE.captures(path)?.get(1)?.as_str();
        let decoded = urlencoding::decode(captured).ok()?;
        StoreSlug::parse(&decoded).ok()
    }

    fn slug_from_host(&self) -> Option<StoreSlug> {
        let host = self.host.as_deref()?;
        let hostname = host.split(':').next().unwrap_or(host);
        let prefix = hostname.split_once("--").map(|(before, _)| before)?;
        StoreSlug::parse(prefix).ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_manager_path() {
        let ctx = RequestContext::for_path("/manager/acme/products");
        assert_eq!(ctx.slug().unwrap().as_str(), "acme");
    }

    #[test]
    fn test_slug_requires_trailing_segment() {
        assert!(RequestContext::for_path("/manager/acme").slug().is_none());
        assert_eq!(
            RequestContext::for_path("/manager/acme/")
                .slug()
                .unwrap()
                .as_str(),
            "acme"
        );
    }

    #[test]
    fn test_slug_percent_decoded() {
        let ctx = RequestContext::for_path("/manager/urban%2Dkicks/orders");
        assert_eq!(ctx.slug().unwrap().as_str(), "urban-kicks");
    }

    #[test]
    fn test_non_manager_path_has_no_slug() {
        assert!(RequestContext::for_path("/s/acme/products").slug().is_none());
        assert!(RequestContext::for_path("/").slug().is_none());
    }

    #[test]
    fn test_slug_from_host_label() {
        let ctx = RequestContext::for_host("acme--admin.example.com");
        assert_eq!(ctx.slug().unwrap().as_str(), "acme");
    }

    #[test]
    fn test_host_port_is_stripped() {
        let ctx = RequestContext::for_host("acme--admin.localhost:3000");
        assert_eq!(ctx.slug().unwrap().as_str(), "acme");
    }

    #[test]
    fn test_plain_host_has_no_slug() {
        assert!(RequestContext::for_host("example.com").slug().is_none());
    }

    #[test]
    fn test_path_wins_over_host() {
        let ctx = RequestContext {
            path: Some("/manager/path-store/x".to_owned()),
            host: Some("host-store--admin.example.com".to_owned()),
        };
        assert_eq!(ctx.slug().unwrap().as_str(), "path-store");
    }

    #[test]
    fn test_override_key_priority_within_scope() {
        let mut overrides = OverrideStore::default();
        overrides.set_persistent("selected_store_id", "t_low");
        overrides.set_persistent("store_id", "t_high");

        let (scope, key, id) = overrides.first_match().unwrap();
        assert_eq!(scope, OverrideScope::Persistent);
        assert_eq!(key, "store_id");
        assert_eq!(id.as_str(), "t_high");
    }

    #[test]
    fn test_persistent_scope_beats_session_scope() {
        let mut overrides = OverrideStore::default();
        overrides.set_session("admin.store_id", "t_session");
        overrides.set_persistent("merchant.store_id", "t_persistent");

        let (scope, _, id) = overrides.first_match().unwrap();
        assert_eq!(scope, OverrideScope::Persistent);
        assert_eq!(id.as_str(), "t_persistent");
    }

    #[test]
    fn test_empty_values_are_skipped_not_matched() {
        let mut overrides = OverrideStore::default();
        overrides.set_persistent("admin.store_id", "");
        overrides.set_persistent("current_store_id", "t_real");

        let (_, key, id) = overrides.first_match().unwrap();
        assert_eq!(key, "current_store_id");
        assert_eq!(id.as_str(), "t_real");
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let mut overrides = OverrideStore::default();
        overrides.set_persistent("favorite_store", "t_x");
        assert!(overrides.first_match().is_none());
    }

    #[test]
    fn test_clear_removes_from_both_scopes() {
        let mut overrides = OverrideStore::default();
        overrides.set_persistent("store_id", "t_1");
        overrides.set_session("store_id", "t_2");
        overrides.clear("store_id");
        assert!(overrides.first_match().is_none());
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_profile_store_id_beats_memberships() {
        let profile = SessionProfile {
            store_id: Some(TenantRef::Id("t_direct".to_owned())),
            stores: vec![TenantRef::Id("t_member".to_owned())],
            ..SessionProfile::default()
        };
        assert_eq!(profile.tenant().unwrap().as_str(), "t_direct");
    }

    #[test]
    fn test_profile_membership_fallback() {
        let profile = SessionProfile {
            stores: vec![
                TenantRef::Id(String::new()),
                TenantRef::Id("t_member".to_owned()),
            ],
            ..SessionProfile::default()
        };
        assert_eq!(profile.tenant().unwrap().as_str(), "t_member");
    }

    #[test]
    fn test_context_debug_redacts_credential() {
        let ctx = SessionContext::anonymous().with_credential("very-private-token");
        let debug_output = format!("{ctx:?}");
        assert!(!debug_output.contains("very-private-token"));
    }
}
