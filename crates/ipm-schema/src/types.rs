//! Name and version newtypes for catalog keys.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Name of an IP package, the catalog's primary key.
///
/// Unlike package names in most registries, IP names are case-sensitive:
/// `EF_AES` and `ef_aes` are different records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpName(String);

impl IpName {
    /// Create a new IP name (stored as-is).
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IpName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for IpName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for IpName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IpName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for IpName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for IpName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for IpName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IpName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A release version string, the key of an IP's release mapping.
///
/// Versions are opaque: ordering is plain byte-wise string ordering, which
/// is what the `latest` tie-break relies on. No semver interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new version from the given string (stored as-is).
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    /// Return the version string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for Version {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Version {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for Version {
    fn eq(&self, other: &String) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_sensitive() {
        assert_ne!(IpName::new("EF_AES"), IpName::new("ef_aes"));
        assert_eq!(IpName::new("EF_AES"), "EF_AES");
    }

    #[test]
    fn test_version_order_is_lexicographic() {
        // Byte-wise, not semver: "1.10.0" sorts before "1.9.0".
        assert!(Version::new("1.10.0") < Version::new("1.9.0"));
        assert!(Version::new("v2") > Version::new("v10"));
        assert!(Version::new("2.0.0") > Version::new("1.1.0"));
    }
}
