//! Tenant identifiers and the tenant reference union.
//!
//! Upstream APIs are inconsistent about how they hand back a store identity:
//! sometimes a bare string id, sometimes a record carrying one of several id
//! fields (`_id`, `id`, `storeId`). [`TenantRef`] models that union as it
//! appears on the wire, and [`TenantRef::normalize`] is the one place in the
//! codebase where an ambiguous reference collapses into a validated
//! [`TenantId`]. Nothing downstream of the gateway boundary should deal in
//! raw strings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TenantId`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum TenantIdError {
    /// The input string is empty.
    #[error("tenant id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("tenant id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// An opaque tenant (store) identifier.
///
/// Tenant ids are issued by the platform backend and treated as opaque
/// tokens here: the only guarantees this type enforces are that an id is
/// non-empty and of sane length. Empty strings are the upstream convention
/// for "no store" and must never normalize into an id.
///
/// ## Examples
///
/// ```
/// use kiosk_core::TenantId;
///
/// assert!(TenantId::parse("t_123").is_ok());
/// assert!(TenantId::parse("689a1c0de9b2f4a7c83d51e2").is_ok());
/// assert!(TenantId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Maximum length of a tenant id.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `TenantId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or longer than 128 characters.
    pub fn parse(s: &str) -> Result<Self, TenantIdError> {
        if s.is_empty() {
            return Err(TenantIdError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(TenantIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the tenant id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `TenantId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TenantId {
    type Err = TenantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A tenant reference as it appears on the wire.
///
/// Session profiles, decoded token claims, and API payloads refer to stores
/// either as a plain id string or as a record with one of several id fields.
/// The untagged representation accepts both shapes; anything else (numbers,
/// arrays) fails deserialization and is treated by callers as "no tenant".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TenantRef {
    /// A bare id string. May be empty on the wire; empty never normalizes.
    Id(String),
    /// A record carrying the id under one of several field names.
    Record(TenantRecord),
}

impl TenantRef {
    /// Collapse the reference into a validated [`TenantId`].
    ///
    /// Record fields are consulted in fixed order: `_id`, then `id`, then
    /// `storeId`. Empty strings are skipped at every step, so a record like
    /// `{"_id": "", "id": "t_9"}` normalizes to `t_9` and a bare `""`
    /// normalizes to `None`.
    #[must_use]
    pub fn normalize(&self) -> Option<TenantId> {
        match self {
            Self::Id(raw) => TenantId::parse(raw).ok(),
            Self::Record(record) => record.normalize(),
        }
    }
}

impl From<TenantId> for TenantRef {
    fn from(id: TenantId) -> Self {
        Self::Id(id.into_inner())
    }
}

/// The record shape of a [`TenantRef`].
///
/// Unknown fields are ignored, so a full store document deserializes here
/// just as well as a minimal `{"id": "..."}` stub.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenantRecord {
    /// Document-store primary key, the most authoritative field when present.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub primary_id: Option<String>,
    /// Conventional id field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Foreign-key style reference used by membership records.
    #[serde(rename = "storeId", skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

impl TenantRecord {
    /// First non-empty id field in priority order, validated.
    #[must_use]
    pub fn normalize(&self) -> Option<TenantId> {
        [&self.primary_id, &self.id, &self.store_id]
            .into_iter()
            .flatten()
            .find_map(|raw| TenantId::parse(raw).ok())
    }
}
