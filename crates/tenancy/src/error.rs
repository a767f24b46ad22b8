//! Error types for tenant resolution and gateway calls.

use kiosk_core::StoreSlug;
use thiserror::Error;

use crate::resolver::ResolutionReport;

/// Errors that can occur while resolving a tenant or calling through the
/// gateway.
#[derive(Debug, Error)]
pub enum TenancyError {
    /// Every resolution source was consulted and none produced a tenant.
    ///
    /// The display string is deliberately user-presentable; the per-source
    /// detail lives in the attached report and belongs in logs, not in UI.
    #[error("no store is linked to this session; select a store and try again")]
    TenantUnresolved(Box<ResolutionReport>),

    /// HTTP request failed before a status was available.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("platform returned {status}: {snippet}")]
    Status {
        /// Response status code.
        status: reqwest::StatusCode,
        /// Leading fragment of the response body.
        snippet: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The platform does not know the slug.
    #[error("no store found for slug {0}")]
    SlugNotFound(StoreSlug),

    /// Slug lookup failed for a reason other than a definite miss.
    ///
    /// Shared lookups hand failures out by reference, so the cause arrives
    /// already formatted.
    #[error("slug lookup failed: {0}")]
    Lookup(String),
}

impl TenancyError {
    /// Returns the resolution report if this is an unresolved-tenant error.
    #[must_use]
    pub fn resolution_report(&self) -> Option<&ResolutionReport> {
        match self {
            Self::TenantUnresolved(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_display_is_clean() {
        let err = TenancyError::TenantUnresolved(Box::default());
        let msg = err.to_string();
        assert!(msg.contains("select a store"));
        // No per-source diagnostics leak into the user-facing message.
        assert!(!msg.contains("slug"));
        assert!(!msg.contains("claims"));
    }

    #[test]
    fn test_slug_not_found_display() {
        let slug = StoreSlug::parse("acme").expect("valid slug");
        let err = TenancyError::SlugNotFound(slug);
        assert_eq!(err.to_string(), "no store found for slug acme");
    }
}
