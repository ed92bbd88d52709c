//! SHA-256 digests as carried by catalog releases.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when a hash string fails strict validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The hex string is not exactly 64 characters long.
    #[error("Invalid SHA256 length: expected 64 chars, got {0}")]
    InvalidLength(usize),

    /// The string contains characters outside `[0-9a-fA-F]`.
    #[error("Invalid SHA256 digest: contains non-hex characters in '{0}'")]
    NonHex(String),
}

/// Newtype for a SHA256 hash string of a release archive.
///
/// Catalog hashes are trusted as migrated, so construction does not validate;
/// [`Sha256Hash::validated`] exists for the client side, which compares a
/// freshly computed digest against the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    /// Create a new `Sha256Hash` without validation (for catalog data).
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Create a validated `Sha256Hash` (64 hex characters), normalised to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidLength`] or [`HashError::NonHex`] when `s`
    /// is not a 64-character hex string.
    pub fn validated(s: &str) -> Result<Self, HashError> {
        if s.len() != 64 {
            return Err(HashError::InvalidLength(s.len()));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::NonHex(s.to_string()));
        }
        Ok(Self(s.to_lowercase()))
    }

    /// Compare against another digest, ignoring hex case.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// Return the inner hex string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no hash was recorded for the release.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Hash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Sha256Hash {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Sha256Hash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
