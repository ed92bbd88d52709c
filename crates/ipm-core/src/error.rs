//! Failure kinds of catalog queries.

use thiserror::Error;

use crate::store::StoreError;

/// Why a catalog query could not produce a result.
///
/// Every kind except [`CatalogError::StoreUnavailable`] is deterministic for
/// a given store content and request, so none of them is retried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("IP '{0}' not found")]
    IpNotFound(String),

    #[error("IP '{0}' has no releases")]
    NoReleasesFound(String),

    #[error("Version '{version}' not found for IP '{name}'")]
    VersionNotFound { name: String, version: String },

    #[error("No eligible releases found for IP '{0}'")]
    NoEligibleReleases(String),

    #[error("Malformed repository reference '{repo}' for IP '{name}': expected host/owner/repo")]
    MalformedRepositoryReference { name: String, repo: String },

    #[error("Catalog store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CatalogError {
    /// Stable machine-readable code for this kind, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::IpNotFound(_) => "IP_NOT_FOUND",
            Self::NoReleasesFound(_) => "NO_RELEASES_FOUND",
            Self::VersionNotFound { .. } => "VERSION_NOT_FOUND",
            Self::NoEligibleReleases(_) => "NO_ELIGIBLE_RELEASES",
            Self::MalformedRepositoryReference { .. } => "MALFORMED_REPOSITORY_REFERENCE",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// True only for failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}
