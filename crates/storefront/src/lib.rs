//! Kiosk storefront library.
//!
//! Serves every merchant's public storefront from one process: the slug in
//! the request path picks the store, the platform API describes it, and the
//! delivery selector decides how to render it. Exposed as a library so
//! integration tests can spawn the full router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod delivery;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod platform;
pub mod routes;
pub mod state;
pub mod themes;
