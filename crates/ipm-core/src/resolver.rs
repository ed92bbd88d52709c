//! Release resolution.
//!
//! Turns a version token into exactly one release of an IP, or a specific
//! failure kind. Pure and synchronous: it only looks at the record it is given.

use ipm_schema::{IpRecord, LATEST, Release, Version};

use crate::error::CatalogError;
use crate::visibility::is_visible;

/// A release selected by [`resolve`], together with the version key it is
/// stored under. `"latest"` is not a storable identifier, so callers need
/// the concrete version back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRelease<'a> {
    pub version: &'a Version,
    pub release: &'a Release,
}

/// Resolve `token` against the releases of `ip`.
///
/// - A concrete token is an exact, case-sensitive key lookup. A draft
///   release stays invisible to callers that did not opt into drafts, even
///   when asked for by version.
/// - `"latest"` picks the visible release with the greatest date. Releases
///   sharing that date are ordered by version string and the
///   lexicographically greatest wins, so the result never depends on
///   storage order.
///
/// # Errors
///
/// - [`CatalogError::NoReleasesFound`] if `ip` has no releases at all.
/// - [`CatalogError::VersionNotFound`] if a concrete token is absent or hidden.
/// - [`CatalogError::NoEligibleReleases`] if `"latest"` finds no visible release.
pub fn resolve<'a>(
    ip: &'a IpRecord,
    token: &str,
    include_drafts: bool,
) -> Result<ResolvedRelease<'a>, CatalogError> {
    if !ip.has_releases() {
        return Err(CatalogError::NoReleasesFound(ip.name.to_string()));
    }

    if token == LATEST {
        return latest(ip, include_drafts)
            .ok_or_else(|| CatalogError::NoEligibleReleases(ip.name.to_string()));
    }

    ip.releases
        .get_key_value(token)
        .filter(|(_, release)| is_visible(release, include_drafts))
        .map(|(version, release)| ResolvedRelease { version, release })
        .ok_or_else(|| CatalogError::VersionNotFound {
            name: ip.name.to_string(),
            version: token.to_string(),
        })
}

fn latest(ip: &IpRecord, include_drafts: bool) -> Option<ResolvedRelease<'_>> {
    ip.releases
        .iter()
        .filter(|(_, release)| is_visible(release, include_drafts))
        .max_by(|(va, ra), (vb, rb)| ra.date.cmp(&rb.date).then_with(|| va.cmp(vb)))
        .map(|(version, release)| ResolvedRelease { version, release })
}
