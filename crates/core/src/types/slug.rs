//! Store slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`StoreSlug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum StoreSlugError {
    /// The input string is empty.
    #[error("store slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("store slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("store slug contains invalid character {ch:?}")]
    InvalidChar {
        /// The offending character.
        ch: char,
    },
}

/// A public store slug, the URL-facing name of a tenant.
///
/// Slugs are generated lowercase by the platform; parsing folds case so that
/// host labels (which are case-insensitive) and path segments land on the
/// same cache key.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Characters: `a-z`, `0-9`, `-`, `_`, `.` (after lowercasing)
///
/// ## Examples
///
/// ```
/// use kiosk_core::StoreSlug;
///
/// assert_eq!(StoreSlug::parse("Acme").unwrap().as_str(), "acme");
/// assert!(StoreSlug::parse("urban-kicks").is_ok());
/// assert!(StoreSlug::parse("").is_err());
/// assert!(StoreSlug::parse("no spaces").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StoreSlug(String);

impl StoreSlug {
    /// Maximum length of a store slug.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `StoreSlug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters, or
    /// contains characters outside `a-z`, `0-9`, `-`, `_`, `.`.
    pub fn parse(s: &str) -> Result<Self, StoreSlugError> {
        if s.is_empty() {
            return Err(StoreSlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(StoreSlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let lowered = s.to_ascii_lowercase();
        let allowed =
            |c: &char| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.');
        if let Some(ch) = lowered.chars().find(|c| !allowed(c)) {
            return Err(StoreSlugError::InvalidChar { ch });
        }

        Ok(Self(lowered))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `StoreSlug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StoreSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoreSlug {
    type Err = StoreSlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for StoreSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
