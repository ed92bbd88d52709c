//! Download reference construction.
//!
//! Every release archive is published as a forge release asset:
//!
//! ```text
//! https://<host>/<owner>/<repo>/releases/download/<version>/<name>-<version>.tar.gz
//! ```
//!
//! Building a reference is pure string work; nothing here touches the network.

use ipm_schema::{IpRecord, Sha256Hash, Version};

use crate::error::CatalogError;
use crate::resolver::ResolvedRelease;

/// A repository reference split into its `host/owner/repo` parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoRef<'a> {
    pub host: &'a str,
    pub owner: &'a str,
    pub repo: &'a str,
}

impl<'a> RepoRef<'a> {
    /// Parse `host/owner/repo`.
    ///
    /// An `http://` or `https://` prefix and a trailing `/` or `.git` are
    /// tolerated. Anything other than exactly three non-empty segments is
    /// rejected.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let mut parts = trimmed.split('/');
        let (Some(host), Some(owner), Some(repo), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        if host.is_empty() || owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(Self { host, owner, repo })
    }
}

/// Where a release archive lives and the digest it must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRef {
    pub url: String,
    pub sha256: Sha256Hash,
    pub version: Version,
}

/// Build the download reference for a release resolved from `ip`.
///
/// The stored digest is passed through untouched.
pub fn build(ip: &IpRecord, resolved: ResolvedRelease<'_>) -> Result<DownloadRef, CatalogError> {
    let repo = RepoRef::parse(&ip.repo).ok_or_else(|| CatalogError::MalformedRepositoryReference {
        name: ip.name.to_string(),
        repo: ip.repo.clone(),
    })?;

    let version = resolved.version;
    let url = format!(
        "https://{}/{}/{}/releases/download/{version}/{}-{version}.tar.gz",
        repo.host, repo.owner, repo.repo, ip.name
    );

    Ok(DownloadRef {
        url,
        sha256: resolved.release.sha256.clone(),
        version: version.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;
    use serde_json::json;

    fn ip(repo: &str) -> IpRecord {
        serde_json::from_value(json!({
            "name": "EF_AES",
            "repo": repo,
            "releases": {
                "v1.1.0": { "date": "2024-02-01", "sha256": "f00dface" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_build_url() {
        let ip = ip("github.com/efabless/EF_AES");
        let resolved = resolve(&ip, "latest", false).unwrap();
        let reference = build(&ip, resolved).unwrap();

        assert_eq!(
            reference.url,
            "https://github.com/efabless/EF_AES/releases/download/v1.1.0/EF_AES-v1.1.0.tar.gz"
        );
        assert_eq!(reference.sha256.as_str(), "f00dface");
        assert_eq!(reference.version, "v1.1.0");
    }

    #[test]
    fn test_build_is_stable() {
        let ip = ip("github.com/efabless/EF_AES");
        let first = build(&ip, resolve(&ip, "v1.1.0", false).unwrap()).unwrap();
        let second = build(&ip, resolve(&ip, "v1.1.0", false).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_tolerates_scheme_and_suffix() {
        for raw in [
            "github.com/efabless/EF_AES",
            "https://github.com/efabless/EF_AES",
            "http://github.com/efabless/EF_AES/",
            "https://github.com/efabless/EF_AES.git",
        ] {
            assert_eq!(
                RepoRef::parse(raw),
                Some(RepoRef {
                    host: "github.com",
                    owner: "efabless",
                    repo: "EF_AES"
                }),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_malformed_repo() {
        for raw in [
            "",
            "EF_AES",
            "efabless/EF_AES",
            "github.com//EF_AES",
            "github.com/efabless/EF_AES/extra",
        ] {
            let ip = ip(raw);
            let resolved = resolve(&ip, "latest", false).unwrap();
            assert_eq!(
                build(&ip, resolved).unwrap_err(),
                CatalogError::MalformedRepositoryReference {
                    name: "EF_AES".into(),
                    repo: raw.into()
                },
                "{raw}"
            );
        }
    }
}
