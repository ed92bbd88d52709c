//! Catalog query service.
//!
//! The read-only entry point used by the HTTP layer. It owns nothing but a
//! shared handle to the store, so cloning it per request is cheap and every
//! query is independent of the others.

use std::sync::Arc;

use ipm_schema::{IpRecord, Sha256Hash, Version};
use serde::Serialize;
use tracing::debug;

use crate::download;
use crate::error::CatalogError;
use crate::resolver::resolve;
use crate::store::{CatalogStore, StoreFilter};
use crate::visibility::prune;

/// Filters for [`CatalogService::list_ips`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub category: Option<String>,
    pub technology: Option<String>,
    pub include_drafts: bool,
}

/// Result of a successful [`CatalogService::get_download_info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadInfo {
    pub url: String,
    pub sha256: Sha256Hash,
    /// The concrete version the request resolved to; never `"latest"`.
    #[serde(rename = "version")]
    pub resolved_version: Version,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// List IPs matching `filter`, in store order, with drafts pruned unless
    /// requested. IPs left without visible releases are still listed.
    pub async fn list_ips(&self, filter: &ListFilter) -> Result<Vec<IpRecord>, CatalogError> {
        let store_filter = StoreFilter {
            category: filter.category.clone(),
            technology: filter.technology.clone(),
        };
        let ips = self.store.find_many(&store_filter).await?;
        debug!(count = ips.len(), ?store_filter, "listed catalog");

        Ok(ips
            .into_iter()
            .map(|ip| prune(ip, filter.include_drafts))
            .collect())
    }

    /// Fetch one IP by exact name, drafts pruned unless requested.
    pub async fn get_ip(&self, name: &str, include_drafts: bool) -> Result<IpRecord, CatalogError> {
        let ip = self.find(name).await?;
        Ok(prune(ip, include_drafts))
    }

    /// Resolve `version` for the IP called `name` and build its download
    /// reference.
    ///
    /// Resolution sees the full record and applies draft visibility itself,
    /// so an IP whose only releases are drafts reports
    /// [`CatalogError::NoEligibleReleases`] for `"latest"` rather than
    /// looking release-less.
    pub async fn get_download_info(
        &self,
        name: &str,
        version: &str,
        include_drafts: bool,
    ) -> Result<DownloadInfo, CatalogError> {
        let ip = self.find(name).await?;
        let resolved = resolve(&ip, version, include_drafts)?;
        let reference = download::build(&ip, resolved)?;
        debug!(%name, requested = version, resolved = %reference.version, "resolved download");

        Ok(DownloadInfo {
            url: reference.url,
            sha256: reference.sha256,
            resolved_version: reference.version,
        })
    }

    /// Number of IPs in the catalog, drafts or not.
    pub async fn count(&self) -> Result<usize, CatalogError> {
        Ok(self.store.count().await?)
    }

    async fn find(&self, name: &str) -> Result<IpRecord, CatalogError> {
        self.store
            .find_by_name(name)
            .await?
            .ok_or_else(|| CatalogError::IpNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CatalogDb, CatalogHandle, MemoryStore};
    use serde_json::json;

    fn record(value: serde_json::Value) -> IpRecord {
        serde_json::from_value(value).unwrap()
    }

    fn catalog() -> Vec<IpRecord> {
        vec![
            record(json!({
                "name": "counter",
                "repo": "github.com/acme/counter",
                "category": "digital",
                "technology": "sky130",
                "releases": {
                    "1.0.0": { "date": "2023-01-01", "sha256": "aaa" },
                    "1.1.0": { "date": "2023-06-01", "sha256": "bbb" },
                    "2.0.0": { "date": "2024-01-01", "draft": true, "sha256": "ccc" }
                }
            })),
            record(json!({
                "name": "adder",
                "repo": "github.com/acme/adder",
                "category": "digital",
                "technology": "gf180mcuC"
            })),
            record(json!({
                "name": "bandgap",
                "repo": "github.com/acme/bandgap",
                "category": "analog",
                "technology": "sky130",
                "releases": {
                    "0.1.0": { "date": "2024-03-01", "draft": true, "sha256": "ddd" }
                }
            })),
            record(json!({
                "name": "broken",
                "repo": "acme-broken",
                "category": "digital",
                "technology": "sky130",
                "releases": {
                    "1.0.0": { "date": "2024-03-01", "sha256": "eee" }
                }
            })),
        ]
    }

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::from_records(catalog())))
    }

    fn names(ips: &[IpRecord]) -> Vec<&str> {
        ips.iter().map(|ip| ip.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_download_latest() {
        let info = service()
            .get_download_info("counter", "latest", false)
            .await
            .unwrap();
        assert_eq!(info.resolved_version, "1.1.0");
        assert_eq!(info.sha256.as_str(), "bbb");
        assert_eq!(
            info.url,
            "https://github.com/acme/counter/releases/download/1.1.0/counter-1.1.0.tar.gz"
        );
    }

    #[tokio::test]
    async fn test_download_latest_with_drafts() {
        let info = service()
            .get_download_info("counter", "latest", true)
            .await
            .unwrap();
        assert_eq!(info.resolved_version, "2.0.0");
        assert_eq!(info.sha256.as_str(), "ccc");
    }

    #[tokio::test]
    async fn test_download_explicit_draft_hidden() {
        let err = service()
            .get_download_info("counter", "2.0.0", false)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::VersionNotFound {
                name: "counter".into(),
                version: "2.0.0".into()
            }
        );
    }

    #[tokio::test]
    async fn test_download_failure_kinds() {
        let service = service();

        assert_eq!(
            service.get_download_info("adder", "latest", false).await.unwrap_err(),
            CatalogError::NoReleasesFound("adder".into())
        );
        assert_eq!(
            service.get_download_info("bandgap", "latest", false).await.unwrap_err(),
            CatalogError::NoEligibleReleases("bandgap".into())
        );
        assert_eq!(
            service.get_download_info("nope", "latest", false).await.unwrap_err(),
            CatalogError::IpNotFound("nope".into())
        );
        assert_eq!(
            service.get_download_info("Counter", "1.0.0", false).await.unwrap_err(),
            CatalogError::IpNotFound("Counter".into())
        );
        assert!(matches!(
            service.get_download_info("broken", "latest", false).await.unwrap_err(),
            CatalogError::MalformedRepositoryReference { .. }
        ));
    }

    #[tokio::test]
    async fn test_download_is_deterministic() {
        let service = service();
        let first = service.get_download_info("counter", "latest", false).await.unwrap();
        for _ in 0..5 {
            let again = service.get_download_info("counter", "latest", false).await.unwrap();
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn test_get_ip_prunes_drafts() {
        let service = service();

        let public = service.get_ip("counter", false).await.unwrap();
        assert!(public.releases.values().all(|r| !r.draft));
        assert_eq!(public.releases.len(), 2);

        let all = service.get_ip("counter", true).await.unwrap();
        assert_eq!(all.releases.len(), 3);

        assert_eq!(
            service.get_ip("missing", false).await.unwrap_err(),
            CatalogError::IpNotFound("missing".into())
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_prunes() {
        let service = service();

        let all = service.list_ips(&ListFilter::default()).await.unwrap();
        assert_eq!(names(&all), vec!["counter", "adder", "bandgap", "broken"]);
        assert!(all.iter().flat_map(|ip| ip.releases.values()).all(|r| !r.draft));

        // Draft-only IPs stay listed with an empty mapping.
        let bandgap = all.iter().find(|ip| ip.name == "bandgap").unwrap();
        assert!(bandgap.releases.is_empty());

        let sky130_digital = service
            .list_ips(&ListFilter {
                category: Some("digital".into()),
                technology: Some("sky130".into()),
                include_drafts: false,
            })
            .await
            .unwrap();
        assert_eq!(names(&sky130_digital), vec!["counter", "broken"]);

        let none = service
            .list_ips(&ListFilter {
                category: Some("Digital".into()),
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_with_drafts() {
        let all = service()
            .list_ips(&ListFilter {
                include_drafts: true,
                ..ListFilter::default()
            })
            .await
            .unwrap();
        let counter = all.iter().find(|ip| ip.name == "counter").unwrap();
        assert_eq!(counter.releases.len(), 3);
    }

    #[tokio::test]
    async fn test_sqlite_store_behaves_like_memory() {
        let handle = CatalogHandle::spawn_with(CatalogDb::open_in_memory().unwrap());
        for ip in catalog() {
            handle.upsert(ip).await.unwrap();
        }
        let service = CatalogService::new(Arc::new(handle.clone()));

        let listed = service.list_ips(&ListFilter::default()).await.unwrap();
        assert_eq!(names(&listed), vec!["counter", "adder", "bandgap", "broken"]);

        let info = service.get_download_info("counter", "latest", false).await.unwrap();
        assert_eq!(info.resolved_version, "1.1.0");
        assert_eq!(service.count().await.unwrap(), 4);

        handle.shutdown();
        let err = service.get_ip("counter", false).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_download_info_serializes_version_field() {
        let info = service().get_download_info("counter", "1.0.0", false).await.unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["sha256"], "aaa");
        assert!(value.get("resolved_version").is_none());
    }
}
