//! Core types for Kiosk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod slug;

pub use id::{TenantId, TenantIdError, TenantRecord, TenantRef};
pub use slug::{StoreSlug, StoreSlugError};
