//! Core type definitions for QuizVault keys and timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Content fingerprint of a question's text.
///
/// Produced by [`fingerprint()`](crate::fingerprint()) and used as the dedup
/// key inside a collection. The value is a 32-bit hash rendered as signed
/// lowercase hex (`"0"`, `"61"`, `"-4e2a1f"`), so two different questions can
/// collide. A collision reads as "already captured" and is never reported as
/// corruption.
///
/// Stored fingerprints written by older installs must stay valid, so the
/// textual form is part of the storage format.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wraps an already-computed hash value.
    #[inline]
    pub(crate) fn from_hash(hash: i32) -> Self {
        // Widen before taking the magnitude so i32::MIN renders as "-80000000".
        let value = hash as i64;
        if value < 0 {
            Self(format!("-{:x}", -value))
        } else {
            Self(format!("{:x}", value))
        }
    }

    /// Parses a fingerprint read from a storage dump.
    ///
    /// Accepts an optional leading `-` followed by one or more lowercase
    /// hex digits, which is everything [`fingerprint()`](crate::fingerprint())
    /// can produce.
    ///
    /// # Example
    /// ```
    /// use quizvault::Fingerprint;
    ///
    /// assert!(Fingerprint::parse("-1f3a").is_ok());
    /// assert!(Fingerprint::parse("XYZ").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        let well_formed = !digits.is_empty()
            && digits.len() <= 8
            && digits
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::MalformedFingerprint(s.to_string()))
        }
    }

    /// Returns the textual form used as the storage key.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the fingerprint and returns its textual form.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unix timestamp in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    ///
    /// If the system clock is before the Unix epoch, returns a timestamp of
    /// 0 (epoch) rather than panicking.
    #[inline]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as i64)
    }

    /// Creates a timestamp from Unix milliseconds.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as Unix milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
