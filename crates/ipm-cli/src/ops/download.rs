//! Release archive download with streaming SHA256 verification.

use std::io::Write;
use std::path::Path;

use futures::StreamExt;
use ipm_schema::Sha256Hash;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Whether `url` points at github.com and should carry the user's token.
pub fn wants_github_token(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = rest.split('/').next().unwrap_or_default();
    host == "github.com" || host.ends_with(".github.com")
}

/// Download `url` to `dest`, hashing as the bytes arrive.
///
/// Returns the hex digest. When `expected` is non-empty and does not match,
/// `dest` is removed and [`DownloadError::HashMismatch`] is returned. `None`
/// skips verification.
pub async fn download_verified(
    client: &Client,
    url: &str,
    dest: &Path,
    expected: Option<&Sha256Hash>,
    github_token: Option<&str>,
) -> Result<String, DownloadError> {
    let mut request = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT);
    if let Some(token) = github_token.filter(|_| wants_github_token(url)) {
        debug!("using GitHub token for download");
        request = request.bearer_auth(token);
    }

    let response = request.send().await?.error_for_status()?;

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await?;
    let actual = hex::encode(hasher.finalize());
    debug!(%url, bytes = downloaded, sha256 = %actual, "downloaded");

    match expected {
        None => {}
        Some(expected) if expected.is_empty() => {
            warn!(%url, "catalog has no sha256 for this release; skipping verification");
        }
        Some(expected) if !expected.matches(&actual) => {
            tokio::fs::remove_file(dest).await.ok();
            return Err(DownloadError::HashMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
        Some(_) => {}
    }

    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::tempdir;

    const BODY: &[u8] = b"hello ipm";

    fn body_hash() -> String {
        hex::encode(Sha256::digest(BODY))
    }

    #[test]
    fn test_wants_github_token() {
        assert!(wants_github_token(
            "https://github.com/efabless/EF_AES/releases/download/v1/EF_AES-v1.tar.gz"
        ));
        assert!(wants_github_token("https://objects.github.com/x"));
        assert!(!wants_github_token("https://gitlab.com/a/b"));
        assert!(!wants_github_token("http://127.0.0.1:1234/github.com/x"));
        assert!(!wants_github_token("https://notgithub.com/x"));
    }

    #[tokio::test]
    async fn test_download_verifies_hash() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/ip.tar.gz")
            .with_status(200)
            .with_body(BODY)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("ip.tar.gz");
        let url = format!("{}/ip.tar.gz", server.url());

        // Upper-case digests from the catalog still match.
        let expected = Sha256Hash::new(body_hash().to_uppercase());
        let actual = download_verified(&Client::new(), &url, &dest, Some(&expected), Some("tok"))
            .await
            .unwrap();

        assert_eq!(actual, body_hash());
        assert_eq!(std::fs::read(&dest).unwrap(), BODY);
    }

    #[tokio::test]
    async fn test_hash_mismatch_removes_file() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/ip.tar.gz")
            .with_status(200)
            .with_body(BODY)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("ip.tar.gz");
        let url = format!("{}/ip.tar.gz", server.url());

        let err = download_verified(
            &Client::new(),
            &url,
            &dest,
            Some(&Sha256Hash::new("00")),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DownloadError::HashMismatch { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let url = format!("{}/missing.tar.gz", server.url());
        let err = download_verified(
            &Client::new(),
            &url,
            &dir.path().join("x"),
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DownloadError::Http(_)));
    }
}
