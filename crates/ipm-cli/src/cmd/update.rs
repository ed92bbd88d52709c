//! Update command

use anyhow::{Result, bail};
use crossterm::style::Stylize;
use ipm_schema::LATEST;

use crate::GlobalOpts;
use crate::ops::{Context, InstallRequest, install_ip};
use crate::ui;

/// Reinstall IPs whose remote `latest` moved past the installed version
pub async fn update(global: &GlobalOpts, name: Option<&str>) -> Result<()> {
    let ctx = Context::new(global)?;
    let db = ctx.open_db()?;
    let records = super::check::installed(&db, name)?;
    if records.is_empty() {
        ui::info("No IPs installed.");
        return Ok(());
    }

    let mut updated = 0usize;
    let mut failed = 0usize;
    for c in super::check::compare(&ctx.api, records).await {
        let ip = &c.installed;
        match &c.latest {
            Err(e) => {
                failed += 1;
                ui::error(&format!("{}: {e}", ip.name));
                continue;
            }
            Ok(_) if !c.is_outdated() => {
                ui::info(&format!("{} {} is up to date", ip.name.as_str().cyan(), ip.version));
                continue;
            }
            Ok(_) => {}
        }

        let request = InstallRequest {
            name: &ip.name,
            version: LATEST,
            include_drafts: false,
            ip_root: &ip.ip_root,
            deps_dir: Some(ip.ip_root.as_path()),
            overwrite: true,
        };
        match install_ip(&ctx, &db, &request).await {
            Ok(new) => {
                updated += 1;
                ui::success(&format!(
                    "{} {} → {}",
                    ip.name.as_str().cyan(),
                    ip.version,
                    new.version
                ));
            }
            Err(e) => {
                failed += 1;
                ui::error(&format!("{}: {e}", ip.name));
            }
        }
    }

    if failed > 0 {
        bail!("{failed} IP(s) failed to update");
    }
    if updated == 0 {
        ui::success("Everything is up to date");
    }
    Ok(())
}
