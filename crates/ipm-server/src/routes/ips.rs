//! Catalog endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use ipm_core::{DownloadInfo, ListFilter};
use ipm_schema::IpRecord;
use serde::{Deserialize, Deserializer};

use crate::AppState;
use crate::error::AppError;
use crate::json::IpListResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/ips", get(list_ips))
        .route("/api/v1/ips/:name", get(get_ip))
        .route("/api/v1/ips/:name/:version/download", get(download_info))
}

/// Query string of the listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub technology: Option<String>,
    #[serde(default)]
    pub include_drafts: bool,
}

impl From<ListParams> for ListFilter {
    fn from(params: ListParams) -> Self {
        Self {
            category: params.category,
            technology: params.technology,
            include_drafts: params.include_drafts,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DraftParams {
    #[serde(default)]
    pub include_drafts: bool,
}

// `?category=` means no filter, not "category is empty".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

async fn list_ips(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<IpListResponse>, AppError> {
    let Query(params) = params?;
    let ips = state.service.list_ips(&params.into()).await?;
    Ok(Json(ips.into()))
}

async fn get_ip(
    State(state): State<AppState>,
    Path(name): Path<String>,
    params: Result<Query<DraftParams>, QueryRejection>,
) -> Result<Json<IpRecord>, AppError> {
    let Query(params) = params?;
    let ip = state.service.get_ip(&name, params.include_drafts).await?;
    Ok(Json(ip))
}

async fn download_info(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
    params: Result<Query<DraftParams>, QueryRejection>,
) -> Result<Json<DownloadInfo>, AppError> {
    let Query(params) = params?;
    let info = state
        .service
        .get_download_info(&name, &version, params.include_drafts)
        .await?;
    Ok(Json(info))
}
