//! Internal implementation of [`ResourceId`].

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Prefix used for bundle `fullUrl` values and internal references.
pub const URN_UUID_PREFIX: &str = "urn:uuid:";

/// A process-unique, opaque resource identifier.
///
/// # Construction
/// - [`ResourceId::new`] allocates a fresh random identifier.
/// - [`ResourceId::parse`] validates an identifier read back from a rendered document.
/// - [`ResourceId::from_full_url`] does the same for a `fullUrl` or reference string.
///
/// # Display format
/// Always the lowercase hyphenated UUID without the `urn:uuid:` prefix. Use
/// [`ResourceId::full_url`] for the prefixed form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(Uuid);

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceId {
    /// Allocates a new random identifier (RFC 4122 version 4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not a lowercase hyphenated UUID.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "resource id must be a lowercase hyphenated UUID, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid resource id '{input}': {e}")))
    }

    /// Parses a `urn:uuid:` full URL or reference string back into an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if the prefix is missing or the remainder is not
    /// canonical.
    pub fn from_full_url(input: &str) -> UuidResult<Self> {
        let rest = input.strip_prefix(URN_UUID_PREFIX).ok_or_else(|| {
            UuidError::InvalidInput(format!("expected '{URN_UUID_PREFIX}' prefix: '{input}'"))
        })?;
        Self::parse(rest)
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns `urn:uuid:<id>`, used both as a bundle entry `fullUrl` and as the reference
    /// string of every internal reference to the resource.
    pub fn full_url(&self) -> String {
        format!("{URN_UUID_PREFIX}{}", self.0.hyphenated())
    }

    /// Returns true if `input` is a lowercase hyphenated UUID (36 characters, hyphens at
    /// positions 8, 13, 18 and 23).
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 36
            && input.bytes().enumerate().all(|(i, b)| match i {
                8 | 13 | 18 | 23 => b == b'-',
                _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
            })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ResourceId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceId::parse(&s).map_err(serde::de::Error::custom)
    }
}
