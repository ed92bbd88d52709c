//! Release availability checks.
//!
//! Walks every IP in the catalog, builds the download reference of each of
//! its releases and issues a `HEAD` against it. Drafts are checked too: they
//! are published assets, just hidden from default queries.

use std::time::Duration;

use ipm_schema::IpRecord;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::download;
use crate::error::CatalogError;
use crate::resolver::resolve;
use crate::store::{CatalogStore, StoreFilter};

/// Availability of a single release archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReleaseStatus {
    Available,
    Missing { http_status: u16 },
    Unreachable { reason: String },
    /// The IP's repository reference cannot produce a URL.
    Malformed,
}

impl ReleaseStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Missing { http_status } => write!(f, "missing (HTTP {http_status})"),
            Self::Unreachable { reason } => write!(f, "unreachable: {reason}"),
            Self::Malformed => write!(f, "malformed repository reference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseCheck {
    pub version: String,
    pub draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub status: ReleaseStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpValidation {
    pub name: String,
    pub repo: String,
    pub releases: Vec<ReleaseCheck>,
}

impl IpValidation {
    /// An IP is usable when at least one of its releases can be fetched.
    pub fn is_valid(&self) -> bool {
        self.releases.iter().any(|r| r.status.is_available())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total_ips: usize,
    pub valid_ips: usize,
    pub invalid_ips: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub summary: ValidationSummary,
    pub ips: Vec<IpValidation>,
}

impl ValidationReport {
    fn push(&mut self, ip: IpValidation) {
        self.summary.total_ips += 1;
        if ip.is_valid() {
            self.summary.valid_ips += 1;
        } else {
            self.summary.invalid_ips += 1;
        }
        self.ips.push(ip);
    }
}

/// HEAD-checks release archives.
#[derive(Debug, Clone)]
pub struct Validator {
    client: Client,
    origin: Option<String>,
}

impl Validator {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            origin: None,
        })
    }

    /// Send checks to `origin` (scheme and authority, e.g. a mirror) instead
    /// of the forge host named in each IP's repository reference.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into().trim_end_matches('/').to_string());
        self
    }

    /// Check every release of every IP in `store`, in store order.
    pub async fn validate_store(
        &self,
        store: &dyn CatalogStore,
    ) -> Result<ValidationReport, CatalogError> {
        let ips = store.find_many(&StoreFilter::default()).await?;
        info!(ips = ips.len(), "validating catalog releases");

        let mut report = ValidationReport::default();
        for ip in &ips {
            report.push(self.validate_ip(ip).await);
        }
        Ok(report)
    }

    pub async fn validate_ip(&self, ip: &IpRecord) -> IpValidation {
        let mut releases = Vec::with_capacity(ip.releases.len());

        for (version, release) in &ip.releases {
            let built = resolve(ip, version, true).and_then(|resolved| download::build(ip, resolved));
            let (url, status) = match built {
                Ok(reference) => {
                    let url = self.rewrite(&reference.url);
                    let status = self.check_url(&url).await;
                    (Some(url), status)
                }
                Err(_) => (None, ReleaseStatus::Malformed),
            };
            debug!(name = %ip.name, %version, %status, "checked release");
            releases.push(ReleaseCheck {
                version: version.to_string(),
                draft: release.draft,
                url,
                status,
            });
        }

        IpValidation {
            name: ip.name.to_string(),
            repo: ip.repo.clone(),
            releases,
        }
    }

    /// Issue a single `HEAD` request and classify the response.
    pub async fn check_url(&self, url: &str) -> ReleaseStatus {
        match self.client.head(url).send().await {
            Ok(resp) if resp.status().is_success() => ReleaseStatus::Available,
            Ok(resp) => ReleaseStatus::Missing {
                http_status: resp.status().as_u16(),
            },
            Err(e) => ReleaseStatus::Unreachable {
                reason: e.to_string(),
            },
        }
    }

    fn rewrite(&self, url: &str) -> String {
        let Some(origin) = &self.origin else {
            return url.to_string();
        };
        // Drop "https://<host>" and keep the path.
        let path = url
            .strip_prefix("https://")
            .and_then(|rest| rest.find('/').map(|i| &rest[i..]))
            .unwrap_or(url);
        format!("{origin}{path}")
    }
}
