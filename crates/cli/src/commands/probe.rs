//! Probe the upload locations for a theme's static export.
//!
//! # Usage
//!
//! ```bash
//! kiosk probe electronics --store acme
//! ```
//!
//! Prints each candidate location with its probe result, then the delivery
//! decision the storefront would make right now.

use kiosk_core::{StoreSlug, StoreSlugError};
use kiosk_storefront::config::derive_content_origin;
use kiosk_storefront::delivery::{DeliveryMode, DeliverySelector};
use thiserror::Error;

/// Errors that can occur while probing.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No API URL was supplied in any form.
    #[error("Missing API URL: pass --api-url or set KIOSK_API_URL")]
    MissingApiUrl,

    /// The API URL does not yield a usable content origin.
    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(String),

    /// The store argument is not a valid slug.
    #[error("Invalid store slug: {0}")]
    InvalidStore(#[from] StoreSlugError),
}

/// Probe every candidate for the theme and print the delivery decision.
pub async fn run(theme: &str, store: &str, api_url: Option<String>) -> Result<(), ProbeError> {
    let api_url = super::api_url_or_env(api_url).ok_or(ProbeError::MissingApiUrl)?;
    let origin = derive_content_origin(&api_url).map_err(ProbeError::InvalidApiUrl)?;
    let store = StoreSlug::parse(store)?;

    let selector = DeliverySelector::new(origin);
    let report = selector.probe_report(theme).await;
    // Decided separately from the report, so a flapping origin shows up as a
    // mismatch between the two.
    let mode = selector.select_for_theme(theme, &store).await;

    #[allow(clippy::print_stdout)]
    {
        for outcome in &report {
            let verdict = if outcome.reachable {
                "reachable"
            } else {
                "unreachable"
            };
            println!("{verdict:>12}  {}", outcome.candidate_url);
        }
        println!();
        match mode {
            DeliveryMode::EmbeddedExport { url } => println!("delivery: embedded export {url}"),
            DeliveryMode::NativeTemplate { theme_slug } => {
                println!("delivery: built-in template {theme_slug}");
            }
            DeliveryMode::Empty => println!("delivery: empty storefront"),
        }
    }
    Ok(())
}
