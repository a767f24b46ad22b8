//! Inspect every tenant resolution source for a hypothetical request.
//!
//! # Usage
//!
//! ```bash
//! # What would a manager page resolve to?
//! kiosk sources --path /manager/acme/products
//!
//! # What does this token's claim set carry?
//! kiosk sources --token "$KIOSK_TOKEN"
//!
//! # Does an operator override win over nothing?
//! kiosk sources --store t_123
//! ```
//!
//! Unlike resolution proper, every source is consulted even after a hit, so
//! the output shows what each one would have contributed.

use clap::Args;
use kiosk_tenancy::{RequestContext, SessionContext, TenantResolver};
use thiserror::Error;

/// Arguments for the `sources` command.
#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Request path to derive a navigation slug from, e.g. /manager/acme/
    #[arg(long)]
    pub path: Option<String>,

    /// Request host to derive a navigation slug from, e.g. acme--admin.example.com
    #[arg(long)]
    pub host: Option<String>,

    /// Bearer token whose claims should be inspected (default: KIOSK_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Session-scope store override to include
    #[arg(long)]
    pub store: Option<String>,

    /// Platform API base URL (default: KIOSK_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,
}

/// Errors that can occur while surveying sources.
#[derive(Debug, Error)]
pub enum SourcesError {
    /// No API URL was supplied in any form.
    #[error("Missing API URL: pass --api-url or set KIOSK_API_URL")]
    MissingApiUrl,
}

/// Survey every resolution source and print the per-source outcomes.
pub async fn run(args: SourcesArgs) -> Result<(), SourcesError> {
    let api_url = super::api_url_or_env(args.api_url).ok_or(SourcesError::MissingApiUrl)?;

    let mut ctx = SessionContext::anonymous();
    if let Some(token) = super::token_or_env(args.token) {
        ctx = ctx.with_credential(token);
    }
    if let Some(store) = args.store {
        ctx.overrides.set_session("store_id", store);
    }

    let nav = RequestContext {
        path: args.path,
        host: args.host,
    };

    let resolver = TenantResolver::new(api_url);
    let (chosen, report) = resolver.survey(&ctx, &nav).await;

    #[allow(clippy::print_stdout)]
    {
        for entry in &report.outcomes {
            println!("{}: {}", entry.source, entry.outcome);
        }
        println!();
        match chosen {
            Some(id) => println!("resolved: {id}"),
            None => println!("resolved: none"),
        }
    }
    Ok(())
}
