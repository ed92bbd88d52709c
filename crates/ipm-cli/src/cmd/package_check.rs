//! Package-check command
//!
//! Walks an IP author's release the way the catalog will see it: the repo,
//! the release tag, the tarball, the `<name>.json` manifest and finally the
//! directory layout. The first step that finds problems reports all of them
//! and ends the run.

use std::path::Path;

use anyhow::{Context as _, Result};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use tracing::debug;

use crate::GlobalOpts;
use crate::ops::Context;
use crate::ops::download::{DownloadError, download_verified, wants_github_token};
use crate::ops::extract::{extract_tar_gz, strip_components};
use crate::ui;

/// Fields every `<name>.json` manifest must carry.
const REQUIRED_FIELDS: [&str; 16] = [
    "name",
    "repo",
    "version",
    "author",
    "email",
    "date",
    "type",
    "category",
    "status",
    "width",
    "height",
    "technology",
    "tag",
    "cell_count",
    "clk_freq",
    "license",
];

const COMMON_DIRS: [&str; 3] = ["verify/beh_model", "fw", "hdl/rtl/bus_wrapper"];
const HARD_DIRS: [&str; 6] = [
    "hdl/gl",
    "timing/lib",
    "timing/sdf",
    "timing/spef",
    "layout/gds",
    "layout/lef",
];
const SOFT_DIGITAL_DIRS: [&str; 3] = ["hdl/rtl/design", "verify/utb", "pnr"];
const ANALOG_DIRS: [&str; 1] = ["spice"];

/// Where a release is expected to live.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PackageUrls {
    repo: String,
    release_tag: String,
    tarball: String,
}

impl PackageUrls {
    fn new(repo: &str, version: &str) -> Self {
        let repo = repo.trim_end_matches('/');
        let repo = if repo.starts_with("https://") || repo.starts_with("http://") {
            repo.to_string()
        } else {
            format!("https://{repo}")
        };

        let tarball = if wants_github_token(&repo) {
            let repo_name = repo.rsplit('/').next().unwrap_or_default();
            format!("{repo}/archive/refs/tags/{repo_name}-{version}.tar.gz")
        } else {
            format!("{repo}/releases/download/{version}/{version}.tar.gz")
        };

        Self {
            release_tag: format!("{repo}/releases/tag/{version}"),
            tarball,
            repo,
        }
    }
}

/// Check that `version` of the IP `name` at `url` is ready to be submitted
pub async fn package_check(global: &GlobalOpts, name: &str, version: &str, url: &str) -> Result<()> {
    let ctx = Context::new(global)?;
    let urls = PackageUrls::new(url, version);
    let scratch = tempfile::Builder::new()
        .prefix(".ipm-check-")
        .tempdir()
        .context("Failed to create scratch directory")?;

    let problems = run_checks(
        &ctx.client,
        ctx.github_token.as_deref(),
        name,
        &urls,
        scratch.path(),
    )
    .await?;

    if !problems.is_empty() {
        for problem in &problems {
            ui::error(problem);
        }
        anyhow::bail!("Package check failed with {} problem(s)", problems.len());
    }

    ui::success("IP pre-check was successful; you can now submit your IP");
    Ok(())
}

/// Run the checks in order, stopping at the first step that finds problems.
async fn run_checks(
    client: &Client,
    github_token: Option<&str>,
    name: &str,
    urls: &PackageUrls,
    scratch: &Path,
) -> Result<Vec<String>> {
    ui::step(1, &format!("Checking the repo {}", urls.repo));
    let status = fetch_status(client, &urls.repo, github_token).await?;
    if let Some(problem) = status_problem(status, &format!("Repo {}", urls.repo)) {
        return Ok(vec![problem]);
    }

    ui::step(2, &format!("Checking the release tag {}", urls.release_tag));
    let status = fetch_status(client, &urls.release_tag, github_token).await?;
    if let Some(problem) = status_problem(status, &format!("Release {}", urls.release_tag)) {
        return Ok(vec![problem]);
    }

    ui::step(3, &format!("Downloading the tarball {}", urls.tarball));
    let archive = scratch.join("release.tar.gz");
    match download_verified(client, &urls.tarball, &archive, None, github_token).await {
        Ok(_) => {}
        Err(DownloadError::Http(e)) => {
            return Ok(vec![format!("No tarball found at {}: {e}", urls.tarball)]);
        }
        Err(e) => return Err(e).context("Failed to download tarball"),
    }

    ui::step(4, &format!("Checking {name}.json"));
    let ip_path = scratch.join("unpacked");
    if let Err(e) = extract_tar_gz(&archive, &ip_path) {
        return Ok(vec![format!("Tarball could not be extracted: {e}")]);
    }
    strip_components(&ip_path).context("Failed to flatten tarball")?;
    let manifest = match check_manifest(&ip_path.join(format!("{name}.json")), name) {
        Ok(manifest) => manifest,
        Err(problems) => return Ok(problems),
    };

    ui::step(5, "Checking the directory layout");
    Ok(check_layout(&ip_path, name, &manifest))
}

async fn fetch_status(client: &Client, url: &str, github_token: Option<&str>) -> Result<StatusCode> {
    let mut request = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT);
    if let Some(token) = github_token.filter(|_| wants_github_token(url)) {
        request = request.bearer_auth(token);
    }
    let status = request
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?
        .status();
    debug!(%url, %status, "checked");
    Ok(status)
}

fn status_problem(status: StatusCode, what: &str) -> Option<String> {
    match status {
        s if s.is_success() => None,
        StatusCode::NOT_FOUND => Some(format!("{what} does not exist")),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(format!(
            "Authentication issue accessing {what}; check GITHUB_TOKEN"
        )),
        s => Some(format!("{what} returned HTTP {s}")),
    }
}

/// Validate the IP's `<name>.json`, returning its fields when it passes.
fn check_manifest(path: &Path, name: &str) -> Result<Map<String, Value>, Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|_| {
        vec![format!(
            "Can't find {}; the IP name {name} might be wrong",
            path.display()
        )]
    })?;
    let manifest = match serde_json::from_str(&content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(vec![format!("{name}.json is not a JSON object")]),
        Err(e) => return Err(vec![format!("{name}.json is not valid JSON: {e}")]),
    };

    let mut problems = Vec::new();
    if manifest.get("name").and_then(Value::as_str) != Some(name) {
        problems.push(format!("The IP name {name} does not match the one in {name}.json"));
    }
    for field in REQUIRED_FIELDS {
        if !manifest.contains_key(field) {
            problems.push(format!("The field '{field}' is missing from {name}.json"));
        }
    }

    if problems.is_empty() { Ok(manifest) } else { Err(problems) }
}

/// Directories and files the IP's type and category call for.
fn check_layout(ip_path: &Path, name: &str, manifest: &Map<String, Value>) -> Vec<String> {
    let ip_type = str_field(manifest, "type");
    let category = str_field(manifest, "category");

    let mut dirs: Vec<&str> = if category == "analog" {
        ANALOG_DIRS.to_vec()
    } else if ip_type == "hard" {
        HARD_DIRS.to_vec()
    } else if ip_type == "soft" && category == "digital" {
        SOFT_DIGITAL_DIRS.to_vec()
    } else {
        Vec::new()
    };
    dirs.extend(COMMON_DIRS);

    let manifest_file = format!("{name}.json");
    let files = [manifest_file.as_str(), "readme.md", "doc/datasheet.pdf"];

    let mut problems = Vec::new();
    for dir in dirs {
        if !ip_path.join(dir).is_dir() {
            problems.push(format!("The directory {dir} is missing"));
        }
    }
    for file in files {
        if !ip_path.join(file).is_file() {
            problems.push(format!("The file {file} is missing"));
        }
    }
    problems
}

fn str_field<'a>(manifest: &'a Map<String, Value>, key: &str) -> &'a str {
    manifest.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use mockito::Server;
    use serde_json::json;
    use tempfile::tempdir;

    const SOFT_DIGITAL_LAYOUT: [&str; 9] = [
        "hdl/rtl/design/aes.v",
        "verify/utb/tb.v",
        "pnr/config.json",
        "verify/beh_model/aes.v",
        "fw/aes.h",
        "hdl/rtl/bus_wrapper/aes_apb.v",
        "readme.md",
        "doc/datasheet.pdf",
        "EF_AES.json",
    ];

    fn manifest() -> Value {
        json!({
            "name": "EF_AES",
            "repo": "github.com/efabless/EF_AES",
            "version": "v1.0.0",
            "author": "Efabless",
            "email": "ip@efabless.com",
            "date": "2024-01-01",
            "type": "soft",
            "category": "digital",
            "status": "verified",
            "width": "0",
            "height": "0",
            "technology": "sky130",
            "tag": ["aes"],
            "cell_count": "1200",
            "clk_freq": "50",
            "license": "Apache-2.0"
        })
    }

    /// A GitHub-style tarball wrapping everything in one top-level directory.
    fn tarball(files: &[&str]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let manifest = manifest().to_string();
        for file in files {
            let data = if *file == "EF_AES.json" {
                manifest.as_bytes()
            } else {
                b"x".as_slice()
            };
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("EF_AES-v1.0.0/{file}"), data)
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Repo and tag exist; the tarball is served when given, 404 otherwise.
    async fn serve_release(server: &mut Server, archive: Option<Vec<u8>>) -> Vec<mockito::Mock> {
        let tarball = server.mock("GET", "/efabless/EF_AES/releases/download/v1.0.0/v1.0.0.tar.gz");
        let tarball = match archive {
            Some(body) => tarball.with_status(200).with_body(body),
            None => tarball.with_status(404),
        };
        vec![
            server
                .mock("GET", "/efabless/EF_AES")
                .with_status(200)
                .create_async()
                .await,
            server
                .mock("GET", "/efabless/EF_AES/releases/tag/v1.0.0")
                .with_status(200)
                .create_async()
                .await,
            tarball.create_async().await,
        ]
    }

    #[test]
    fn test_urls_for_github_repo() {
        let urls = PackageUrls::new("github.com/efabless/EF_AES", "v1.0.0");
        assert_eq!(urls.repo, "https://github.com/efabless/EF_AES");
        assert_eq!(
            urls.release_tag,
            "https://github.com/efabless/EF_AES/releases/tag/v1.0.0"
        );
        assert_eq!(
            urls.tarball,
            "https://github.com/efabless/EF_AES/archive/refs/tags/EF_AES-v1.0.0.tar.gz"
        );
    }

    #[test]
    fn test_urls_for_other_hosts() {
        let urls = PackageUrls::new("https://gitlab.com/efabless/EF_AES/", "v1.0.0");
        assert_eq!(urls.repo, "https://gitlab.com/efabless/EF_AES");
        assert_eq!(
            urls.tarball,
            "https://gitlab.com/efabless/EF_AES/releases/download/v1.0.0/v1.0.0.tar.gz"
        );
    }

    #[test]
    fn test_manifest_reports_every_problem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EF_AES.json");

        assert_eq!(check_manifest(&path, "EF_AES").unwrap_err().len(), 1);

        std::fs::write(&path, r#"{"name": "EF_AES_v2", "repo": "x"}"#).unwrap();
        let problems = check_manifest(&path, "EF_AES").unwrap_err();
        // name mismatch plus the 14 missing fields
        assert_eq!(problems.len(), 15);
        assert!(problems[0].contains("does not match"));

        std::fs::write(&path, manifest().to_string()).unwrap();
        assert!(check_manifest(&path, "EF_AES").is_ok());
    }

    #[test]
    fn test_layout_for_analog_ignores_soft_dirs() {
        let dir = tempdir().unwrap();
        for sub in ["spice", "verify/beh_model", "fw", "hdl/rtl/bus_wrapper", "doc"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        for file in ["EF_ADC.json", "readme.md", "doc/datasheet.pdf"] {
            std::fs::write(dir.path().join(file), "x").unwrap();
        }

        let mut analog = manifest();
        analog["category"] = json!("analog");
        let Value::Object(analog) = analog else {
            unreachable!()
        };
        assert!(check_layout(dir.path(), "EF_ADC", &analog).is_empty());

        let Value::Object(digital) = manifest() else {
            unreachable!()
        };
        assert_eq!(check_layout(dir.path(), "EF_ADC", &digital).len(), 3);
    }

    #[tokio::test]
    async fn test_complete_release_passes() {
        let mut server = Server::new_async().await;
        let _mocks = serve_release(&mut server, Some(tarball(&SOFT_DIGITAL_LAYOUT))).await;

        let scratch = tempdir().unwrap();
        let urls = PackageUrls::new(&format!("{}/efabless/EF_AES", server.url()), "v1.0.0");
        let problems = run_checks(&Client::new(), None, "EF_AES", &urls, scratch.path())
            .await
            .unwrap();

        assert!(problems.is_empty(), "{problems:?}");
    }

    #[tokio::test]
    async fn test_missing_dirs_are_reported() {
        let mut server = Server::new_async().await;
        let files: Vec<&str> = SOFT_DIGITAL_LAYOUT
            .into_iter()
            .filter(|f| !f.starts_with("pnr/") && !f.starts_with("fw/"))
            .collect();
        let _mocks = serve_release(&mut server, Some(tarball(&files))).await;

        let scratch = tempdir().unwrap();
        let urls = PackageUrls::new(&format!("{}/efabless/EF_AES", server.url()), "v1.0.0");
        let problems = run_checks(&Client::new(), None, "EF_AES", &urls, scratch.path())
            .await
            .unwrap();

        assert_eq!(
            problems,
            [
                "The directory pnr is missing",
                "The directory fw is missing"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_repo_stops_early() {
        let mut server = Server::new_async().await;
        let _repo = server
            .mock("GET", "/efabless/EF_AES")
            .with_status(404)
            .create_async()
            .await;
        let release = server
            .mock("GET", "/efabless/EF_AES/releases/tag/v1.0.0")
            .expect(0)
            .create_async()
            .await;

        let scratch = tempdir().unwrap();
        let urls = PackageUrls::new(&format!("{}/efabless/EF_AES", server.url()), "v1.0.0");
        let problems = run_checks(&Client::new(), None, "EF_AES", &urls, scratch.path())
            .await
            .unwrap();

        assert_eq!(problems.len(), 1);
        assert!(problems[0].ends_with("does not exist"));
        release.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_tarball_is_reported() {
        let mut server = Server::new_async().await;
        let _mocks = serve_release(&mut server, None).await;

        let scratch = tempdir().unwrap();
        let urls = PackageUrls::new(&format!("{}/efabless/EF_AES", server.url()), "v1.0.0");
        let problems = run_checks(&Client::new(), None, "EF_AES", &urls, scratch.path())
            .await
            .unwrap();

        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("No tarball found"));
    }
}
