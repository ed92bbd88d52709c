//! Install-dep command

use std::path::Path;

use anyhow::{Result, bail};
use crossterm::style::Stylize;

use crate::ops::deps::{self, DepsFile};
use crate::ops::install::is_populated;
use crate::ops::{Context, InstallRequest, install_ip};
use crate::ui;
use crate::{GlobalOpts, IpRootOpt};

/// Install every IP pinned in `dependencies.json`
pub async fn install_dep(
    global: &GlobalOpts,
    ip_root: &IpRootOpt,
    deps_file: Option<&Path>,
    overwrite: bool,
) -> Result<()> {
    let ip_root = ip_root.resolve()?;
    let deps_path = deps::deps_path(deps_file.unwrap_or(&ip_root));
    if !deps_path.exists() {
        bail!("No dependencies file at {}", deps_path.display());
    }
    let pinned = DepsFile::load(&deps_path)?;
    if pinned.ips.is_empty() {
        ui::info("No dependencies to install.");
        return Ok(());
    }

    let ctx = Context::new(global)?;
    let db = ctx.open_db()?;
    let mut failed = 0usize;

    for dep in &pinned.ips {
        if !overwrite && is_populated(&ip_root.join(&dep.name)) {
            ui::info(&format!(
                "{} already present, skipping",
                dep.name.as_str().cyan()
            ));
            continue;
        }

        // A pin is an exact version, possibly one installed with --include-drafts.
        let request = InstallRequest {
            name: &dep.name,
            version: &dep.version,
            include_drafts: true,
            ip_root: &ip_root,
            deps_dir: None,
            overwrite,
        };
        match install_ip(&ctx, &db, &request).await {
            Ok(installed) => ui::success(&format!(
                "{} {} installed",
                installed.name.as_str().cyan(),
                installed.version
            )),
            Err(e) => {
                failed += 1;
                ui::error(&format!("{} {}: {e}", dep.name, dep.version));
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} dependencies failed to install", pinned.ips.len());
    }
    Ok(())
}
