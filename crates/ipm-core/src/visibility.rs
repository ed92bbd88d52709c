//! Draft visibility.
//!
//! The single place that decides whether a release is visible to a caller.
//! Listing, single-IP lookup and `latest` resolution all go through here, so
//! the public/draft partition is applied identically on every path.

use ipm_schema::{IpRecord, Release};

/// Whether `release` is visible to a caller with the given draft preference.
pub fn is_visible(release: &Release, include_drafts: bool) -> bool {
    include_drafts || !release.draft
}

/// Drop draft releases from `ip` unless `include_drafts` is set.
pub fn prune(mut ip: IpRecord, include_drafts: bool) -> IpRecord {
    if !include_drafts {
        ip.releases
            .retain(|_, release| is_visible(release, include_drafts));
    }
    ip
}
