//! Resolve a store slug to its tenant id.
//!
//! # Usage
//!
//! ```bash
//! kiosk resolve acme
//! ```
//!
//! Prints the tenant id on success. A slug the platform does not know exits
//! non-zero with `no store found for slug ...`.

use kiosk_core::{StoreSlug, StoreSlugError};
use kiosk_tenancy::{TenancyError, TenantResolver};
use thiserror::Error;

/// Errors that can occur while resolving a slug.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No API URL was supplied in any form.
    #[error("Missing API URL: pass --api-url or set KIOSK_API_URL")]
    MissingApiUrl,

    /// The argument is not a valid store slug.
    #[error("Invalid slug: {0}")]
    InvalidSlug(#[from] StoreSlugError),

    /// The lookup itself failed.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] TenancyError),
}

/// Look the slug up against the platform and print the tenant id.
pub async fn run(raw_slug: &str, api_url: Option<String>) -> Result<(), ResolveError> {
    let api_url = super::api_url_or_env(api_url).ok_or(ResolveError::MissingApiUrl)?;
    let slug = StoreSlug::parse(raw_slug)?;

    let resolver = TenantResolver::new(api_url);
    let tenant = resolver.lookup_slug(&slug).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{tenant}");
    }
    Ok(())
}
