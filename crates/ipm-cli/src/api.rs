//! HTTP client for the IPM backend.

use ipm_schema::{IpRecord, Sha256Hash, Version};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Could not reach the IPM backend: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error body.
    #[error("{message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
}

impl ApiError {
    /// The backend's error code, if it answered with one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::Http(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct IpList {
    ips: Vec<IpRecord>,
}

/// Where to fetch a release archive and what it must hash to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteDownload {
    pub url: String,
    pub sha256: Sha256Hash,
    pub version: Version,
}

#[derive(Debug, Clone, Default)]
pub struct RemoteFilter<'a> {
    pub category: Option<&'a str>,
    pub technology: Option<&'a str>,
    pub include_drafts: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_ips(&self, filter: &RemoteFilter<'_>) -> Result<Vec<IpRecord>, ApiError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(category) = filter.category {
            query.push(("category", category));
        }
        if let Some(technology) = filter.technology {
            query.push(("technology", technology));
        }
        if filter.include_drafts {
            query.push(("include_drafts", "true"));
        }

        let list: IpList = self.get("/api/v1/ips", &query).await?;
        Ok(list.ips)
    }

    pub async fn get_ip(&self, name: &str, include_drafts: bool) -> Result<IpRecord, ApiError> {
        let path = format!("/api/v1/ips/{name}");
        self.get(&path, &drafts_query(include_drafts)).await
    }

    pub async fn download_info(
        &self,
        name: &str,
        version: &str,
        include_drafts: bool,
    ) -> Result<RemoteDownload, ApiError> {
        let path = format!("/api/v1/ips/{name}/{version}/download");
        self.get(&path, &drafts_query(include_drafts)).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, ?query, "catalog request");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .query(query)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

fn drafts_query(include_drafts: bool) -> Vec<(&'static str, &'static str)> {
    if include_drafts {
        vec![("include_drafts", "true")]
    } else {
        Vec::new()
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.message),
        Err(_) => ("HTTP_ERROR".to_string(), format!("Backend returned HTTP {status}")),
    };
    Err(ApiError::Api {
        status,
        code,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(server: &Server) -> CatalogClient {
        CatalogClient::new(Client::new(), &server.url())
    }

    #[tokio::test]
    async fn test_list_ips_with_filters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/ips")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("category".into(), "digital".into()),
                Matcher::UrlEncoded("include_drafts".into(), "true".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ips": [{"name": "EF_AES", "category": "digital"}], "count": 1}"#)
            .create_async()
            .await;

        let ips = client(&server)
            .list_ips(&RemoteFilter {
                category: Some("digital"),
                technology: None,
                include_drafts: true,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(ips.len(), 1);
        assert_eq!(ips[0].name, "EF_AES");
    }

    #[tokio::test]
    async fn test_download_info() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/ips/EF_AES/latest/download")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"url": "https://github.com/efabless/EF_AES/releases/download/v1.0.0/EF_AES-v1.0.0.tar.gz",
                    "sha256": "abc", "version": "v1.0.0"}"#,
            )
            .create_async()
            .await;

        let info = client(&server)
            .download_info("EF_AES", "latest", false)
            .await
            .unwrap();
        assert_eq!(info.version, "v1.0.0");
        assert_eq!(info.sha256.as_str(), "abc");
    }

    #[tokio::test]
    async fn test_error_body_is_kept() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/ips/nope")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": true, "code": "IP_NOT_FOUND", "message": "IP 'nope' not found"}"#)
            .create_async()
            .await;

        let err = client(&server).get_ip("nope", false).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.code(), Some("IP_NOT_FOUND"));
        assert_eq!(err.to_string(), "IP 'nope' not found");
    }

    #[tokio::test]
    async fn test_non_json_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/ips/x")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = client(&server).get_ip("x", false).await.unwrap_err();
        assert_eq!(err.code(), Some("HTTP_ERROR"));
        assert!(!err.is_not_found());
    }
}
