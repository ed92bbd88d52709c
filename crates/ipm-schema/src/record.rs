//! Catalog records: one [`IpRecord`] per IP, each owning its [`Release`]s.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::hash::Sha256Hash;
use crate::lenient;
use crate::types::{IpName, Version};

/// Whether an IP is delivered as RTL (soft) or as a hardened macro (hard).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IpType {
    /// Synthesizable source; no fixed physical footprint.
    #[default]
    #[serde(alias = "Soft", alias = "SOFT")]
    Soft,
    /// Hardened layout with a fixed width and height.
    #[serde(alias = "Hard", alias = "HARD")]
    Hard,
}

impl std::fmt::Display for IpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Soft => write!(f, "soft"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// One published version of an IP.
///
/// Immutable once migrated. A release has no identity of its own: it is
/// addressed by the version key under which its owning [`IpRecord`] stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Release date; drives `latest` resolution.
    #[serde(with = "lenient::date")]
    pub date: NaiveDate,

    /// Maturity level (e.g. `"stable"`, `"experimental"`).
    #[serde(default)]
    pub maturity: String,

    /// Supported bus interfaces (e.g. `"WB"`, `"APB"`).
    #[serde(default)]
    pub bus: Vec<String>,

    /// Soft or hard IP.
    #[serde(rename = "type", default)]
    pub ip_type: IpType,

    /// Physical width in µm (hard IPs only).
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<f64>,

    /// Physical height in µm (hard IPs only).
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,

    /// Standard cell count, when known.
    #[serde(
        default,
        deserialize_with = "lenient::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub cell_count: Option<u64>,

    /// Maximum clock frequency in MHz, when known.
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub clock_freq_mhz: Option<f64>,

    /// Supply voltages in volts.
    #[serde(default, deserialize_with = "lenient::f64_list")]
    pub supply_voltage: Vec<f64>,

    /// Draft releases are hidden unless a caller opts in.
    #[serde(default)]
    pub draft: bool,

    /// Digest of the release's distributable archive, trusted as migrated.
    #[serde(default)]
    pub sha256: Sha256Hash,
}

/// One IP package and all of its releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpRecord {
    /// Unique, immutable name; the store's primary key.
    #[serde(alias = "_id")]
    pub name: IpName,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Source repository as `host/owner/repo` (e.g. `github.com/efabless/EF_AES`).
    #[serde(default)]
    pub repo: String,

    /// Author name.
    #[serde(default)]
    pub author: String,

    /// Contact email.
    #[serde(default)]
    pub email: String,

    /// Owning organisation.
    #[serde(default)]
    pub owner: String,

    /// Domain tag (e.g. `digital`, `analog`, `comm`, `dataconv`).
    #[serde(default)]
    pub category: String,

    /// Technology node (e.g. `sky130`, `gf180mcuC`).
    #[serde(default)]
    pub technology: String,

    /// License identifier.
    #[serde(default)]
    pub license: String,

    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Releases keyed by version string, ordered by version on output.
    #[serde(default)]
    pub releases: BTreeMap<Version, Release>,
}

impl IpRecord {
    /// Look up a release by its exact (case-sensitive) version key.
    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.get(version)
    }

    /// True when the record carries at least one release, draft or not.
    pub fn has_releases(&self) -> bool {
        !self.releases.is_empty()
    }
}
