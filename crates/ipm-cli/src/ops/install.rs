//! IP installation
//!
//! Resolve a release through the backend, download and verify its archive,
//! unpack it into `<ip_root>/<name>` and record the result.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::context::Context;
use super::deps::{self, Dependency, DepsError};
use super::download::{DownloadError, download_verified};
use super::extract::{ExtractError, extract_tar_gz, strip_components};
use crate::api::ApiError;
use crate::db::{DbError, InstalledIp, StateDb};

#[derive(Error, Debug)]
pub enum InstallError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("State database error: {0}")]
    Db(#[from] DbError),

    #[error(transparent)]
    Deps(#[from] DepsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} already exists and is not empty; pass --overwrite to replace it", .0.display())]
    AlreadyInstalled(PathBuf),
}

#[derive(Debug, Clone)]
pub struct InstallRequest<'a> {
    pub name: &'a str,
    /// Exact version or `latest`.
    pub version: &'a str,
    pub include_drafts: bool,
    pub ip_root: &'a Path,
    /// Directory of the `dependencies.json` to pin into. `None` leaves it alone.
    pub deps_dir: Option<&'a Path>,
    pub overwrite: bool,
}

/// Whether `path` is a directory with at least one entry.
pub fn is_populated(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}

/// Install one IP. Returns the recorded installation.
pub async fn install_ip(
    ctx: &Context,
    db: &StateDb,
    req: &InstallRequest<'_>,
) -> Result<InstalledIp, InstallError> {
    let target = req.ip_root.join(req.name);
    if is_populated(&target) && !req.overwrite {
        return Err(InstallError::AlreadyInstalled(target));
    }

    let record = ctx.api.get_ip(req.name, req.include_drafts).await?;
    let download = ctx
        .api
        .download_info(req.name, req.version, req.include_drafts)
        .await?;
    debug!(ip = req.name, version = %download.version, url = %download.url, "resolved");

    fs::create_dir_all(req.ip_root)?;
    let staging = tempfile::Builder::new()
        .prefix(".ipm-")
        .tempdir_in(req.ip_root)?;

    let file_name = match ipm_core::filename_from_url(&download.url) {
        "" => format!("{}.tar.gz", req.name),
        name => name.to_string(),
    };
    let archive = staging.path().join(file_name);
    let sha256 = download_verified(
        &ctx.client,
        &download.url,
        &archive,
        Some(&download.sha256),
        ctx.github_token.as_deref(),
    )
    .await?;

    let unpacked = staging.path().join("unpacked");
    let files = extract_tar_gz(&archive, &unpacked)?;
    strip_components(&unpacked)?;
    debug!(ip = req.name, files, "extracted");

    // The old tree is dropped with the staging dir once the new one is in place.
    swap_into_place(&unpacked, &target, &staging.path().join("previous"))?;

    let installed = InstalledIp {
        name: req.name.to_string(),
        ip_root: req.ip_root.to_path_buf(),
        version: download.version.to_string(),
        sha256,
        technology: record.technology.clone(),
        category: record.category.clone(),
        installed_at: chrono::Utc::now().timestamp(),
    };
    db.record_install(&installed)?;

    if let Some(dir) = req.deps_dir {
        deps::update_in(dir, |file| {
            file.upsert(Dependency {
                name: installed.name.clone(),
                version: installed.version.clone(),
                technology: installed.technology.clone(),
            });
        })?;
    }

    info!(ip = req.name, version = %installed.version, path = %target.display(), "installed");
    Ok(installed)
}

/// Move `new` to `target`, parking any existing `target` at `backup`.
///
/// If the move fails the parked tree is put back.
fn swap_into_place(new: &Path, target: &Path, backup: &Path) -> std::io::Result<()> {
    let parked = target.exists();
    if parked {
        fs::rename(target, backup)?;
    }

    if let Err(e) = fs::rename(new, target) {
        if parked {
            fs::rename(backup, target)?;
        }
        return Err(e);
    }
    Ok(())
}

/// Remove an installed IP's directory, its state record and its pin.
///
/// Returns whether anything was there to remove.
pub fn uninstall_files(
    db: &StateDb,
    name: &str,
    ip_root: &Path,
    deps_dir: Option<&Path>,
) -> Result<bool, InstallError> {
    let target = ip_root.join(name);
    let had_files = target.exists();
    if had_files {
        fs::remove_dir_all(&target)?;
    }

    let had_record = db.remove(name, ip_root)?;

    let mut had_pin = false;
    if let Some(dir) = deps_dir.filter(|d| deps::deps_path(d).exists()) {
        deps::update_in(dir, |file| had_pin = file.remove(name))?;
    }

    Ok(had_files || had_record || had_pin)
}
