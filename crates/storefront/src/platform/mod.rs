//! Clients for the Kiosk platform API.
//!
//! The storefront talks to two public surfaces of the platform: the live
//! storefront payload (`/s/live/{slug}`) and the customer account endpoints
//! (`/store/customers/*`). Both speak the platform's `{success, data}`
//! envelope convention.

pub mod customers;
pub mod live;

pub use customers::{CustomerAccount, CustomerAuth, CustomerClient};
pub use live::{
    CategorySummary, LiveStore, LiveStoreClient, ProductSummary, StoreProfile, ThemeSummary,
};

use thiserror::Error;

/// Max characters of a response body carried inside an error.
pub(crate) const BODY_SNIPPET_CHARS: usize = 200;

/// Errors from platform API calls.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Transport-level failure (connection refused, timeout, DNS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Platform answered with a non-success status.
    #[error("platform returned {status}: {snippet}")]
    Status {
        status: reqwest::StatusCode,
        snippet: String,
    },

    /// Platform answered 2xx but the body did not parse.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Platform answered success but the payload lacks required data.
    #[error("platform response missing data: {0}")]
    MissingData(String),

    /// Platform understood the request and refused it (bad credentials,
    /// duplicate account).
    #[error("platform rejected the request: {0}")]
    Rejected(String),
}

/// Truncate a response body for inclusion in errors and logs.
pub(crate) fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let body = "x".repeat(1000);
        assert_eq!(snippet(&body).len(), BODY_SNIPPET_CHARS);
    }

    #[test]
    fn test_snippet_keeps_short_bodies() {
        assert_eq!(snippet("short"), "short");
    }
}
