//! Install command

use std::path::Path;

use anyhow::{Context as _, Result};
use crossterm::style::Stylize;

use crate::ops::{Context, InstallRequest, install_ip};
use crate::ui;
use crate::{GlobalOpts, IpRootOpt};

/// Install one IP into the IP root and pin it in `dependencies.json`
#[allow(clippy::fn_params_excessive_bools)]
pub async fn install(
    global: &GlobalOpts,
    name: &str,
    version: &str,
    include_drafts: bool,
    ip_root: &IpRootOpt,
    overwrite: bool,
    deps_file: Option<&Path>,
) -> Result<()> {
    let ctx = Context::new(global)?;
    let db = ctx.open_db()?;
    let ip_root = ip_root.resolve()?;
    let deps_dir = deps_file.unwrap_or(&ip_root);

    let request = InstallRequest {
        name,
        version,
        include_drafts,
        ip_root: &ip_root,
        deps_dir: Some(deps_dir),
        overwrite,
    };
    let installed = install_ip(&ctx, &db, &request)
        .await
        .with_context(|| format!("Failed to install {name}"))?;

    ui::success(&format!(
        "{} {} installed to {}",
        installed.name.as_str().cyan(),
        installed.version,
        installed.path().display()
    ));
    Ok(())
}
