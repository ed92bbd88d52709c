//! Uninstall command

use std::path::Path;

use anyhow::{Result, bail};
use crossterm::style::Stylize;

use crate::ops::uninstall_files;
use crate::ui;
use crate::{GlobalOpts, IpRootOpt};

/// Remove an IP's files, its state record and its dependency pin
pub fn uninstall(
    global: &GlobalOpts,
    name: &str,
    ip_root: &IpRootOpt,
    deps_file: Option<&Path>,
) -> Result<()> {
    let db = super::open_db(global)?;
    let ip_root = ip_root.resolve()?;

    if !uninstall_files(&db, name, &ip_root, Some(deps_file.unwrap_or(&ip_root)))? {
        bail!("{name} is not installed in {}", ip_root.display());
    }

    ui::success(&format!("{} uninstalled", name.cyan()));
    Ok(())
}
