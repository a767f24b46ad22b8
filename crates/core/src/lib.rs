//! Kiosk Core - Shared types library.
//!
//! This crate provides common types used across all Kiosk components:
//! - `tenancy` - Tenant identity resolution and the authenticated API gateway
//! - `storefront` - Public-facing storefront delivery server
//! - `cli` - Operator diagnostics and gateway tooling
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Every store
//! identifier that crosses a platform boundary is expressed here, so there is
//! exactly one place that knows how a raw wire value becomes a [`TenantId`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for tenant ids, the tenant reference union,
//!   and validated store slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
