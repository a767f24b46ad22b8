//! Tolerant decoding of bearer-token claims.
//!
//! Credentials issued by the platform are JWT-shaped (`header.payload.sig`)
//! with a JSON claims object in the middle segment. The resolver only wants
//! the store reference out of that payload; it never verifies the signature
//! and never rejects a request because the token looked odd. Anything that
//! fails to decode simply yields `None` and the resolution chain moves on.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use kiosk_core::{TenantId, TenantRef};
use serde::Deserialize;

/// Claims carried in the payload segment of a platform credential.
///
/// Unknown fields are ignored; every known field is optional because tokens
/// from older platform versions omit most of them.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject (account id).
    #[serde(default)]
    pub sub: Option<String>,
    /// Account role, e.g. `admin` or `merchant`.
    #[serde(default)]
    pub role: Option<String>,
    /// Direct store reference.
    #[serde(rename = "storeId", default)]
    pub store_id: Option<TenantRef>,
    /// Store memberships, first entry is the default store.
    #[serde(default)]
    pub stores: Vec<TenantRef>,
    /// Expiry as unix seconds. Informational only; the platform is the
    /// authority on token validity.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued-at as unix seconds.
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// The store these claims point at: `storeId` first, then the first
    /// normalizable membership entry.
    #[must_use]
    pub fn tenant(&self) -> Option<TenantId> {
        self.store_id
            .as_ref()
            .and_then(TenantRef::normalize)
            .or_else(|| self.stores.iter().find_map(TenantRef::normalize))
    }
}

/// Decode the claims segment of a bearer token.
///
/// Requires exactly three dot-separated segments. The payload is tried as
/// URL-safe base64 first, then the standard alphabet with and without
/// padding, matching what browser-side `atob` decoders accepted. Returns
/// `None` on any structural or parse failure.
#[must_use]
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = decode_segment(payload)?;
    serde_json::from_slice(&bytes).ok()
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| STANDARD.decode(segment))
        .or_else(|_| STANDARD_NO_PAD.decode(segment))
        .ok()
}
