//! Kiosk Tenancy - tenant identity resolution and the authenticated gateway.
//!
//! Every request that touches tenant-scoped platform APIs has to answer one
//! question first: *which store is this?* The answer can come from several
//! places of very different trustworthiness, so resolution runs a fixed
//! priority chain and stops at the first source that produces a usable id:
//!
//! 1. Navigation slug (manager path or `slug--` host label), verified against
//!    the platform and cached per slug
//! 2. The session profile
//! 3. Claims decoded from the bearer credential
//! 4. Manual operator overrides (persistent scope before session scope)
//!
//! Failures inside a source are swallowed and logged; only a fully exhausted
//! chain surfaces as [`TenancyError::TenantUnresolved`], carrying a
//! [`ResolutionReport`] of what each source said.
//!
//! The [`TenantGateway`] sits on top: it re-resolves before every call and
//! stamps the canonical tenant id into the query string or body, overwriting
//! whatever the caller supplied, so a stale or spoofed `storeId` can never
//! reach the platform.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod claims;
pub mod context;
pub mod error;
pub mod gateway;
pub mod resolver;

pub use claims::{TokenClaims, decode_claims};
pub use context::{
    OVERRIDE_KEYS, OverrideScope, OverrideStore, RequestContext, SessionContext, SessionProfile,
};
pub use error::TenancyError;
pub use gateway::{MultipartPayload, Payload, TENANT_FIELD, TenantGateway};
pub use resolver::{ResolutionReport, SourceOutcome, TenantResolver, TenantSource};
