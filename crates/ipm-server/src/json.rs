//! JSON response types.

use ipm_schema::IpRecord;
use serde::Serialize;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the catalog store cannot be reached.
    pub status: String,
    pub version: String,
    /// Number of IPs in the catalog, when the store answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ips: Option<usize>,
}

/// Body of the catalog listing.
#[derive(Debug, Serialize)]
pub struct IpListResponse {
    pub ips: Vec<IpRecord>,
    pub count: usize,
}

impl From<Vec<IpRecord>> for IpListResponse {
    fn from(ips: Vec<IpRecord>) -> Self {
        Self {
            count: ips.len(),
            ips,
        }
    }
}
