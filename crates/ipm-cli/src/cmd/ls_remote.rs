//! Ls-remote command

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use ipm_core::resolver;
use ipm_schema::LATEST;

use crate::GlobalOpts;
use crate::api::RemoteFilter;
use crate::ui::{self, Table};

/// List the verified IPs the backend offers
pub async fn ls_remote(
    global: &GlobalOpts,
    category: Option<&str>,
    technology: Option<&str>,
    include_drafts: bool,
) -> Result<()> {
    let api = super::catalog(global)?;
    let filter = RemoteFilter {
        category,
        technology,
        include_drafts,
    };
    let ips = api
        .list_ips(&filter)
        .await
        .with_context(|| format!("Failed to list IPs from {}", api.base_url()))?;

    if ips.is_empty() {
        ui::info("No IPs match.");
        return Ok(());
    }

    let mut table = Table::new(&[
        "IP",
        "LATEST",
        "CATEGORY",
        "TECHNOLOGY",
        "TYPE",
        "MATURITY",
        "LICENSE",
    ]);
    for ip in &ips {
        // Listed IPs may have no visible release left.
        let (version, ip_type, maturity) = match resolver::resolve(ip, LATEST, include_drafts) {
            Ok(latest) => (
                latest.version.to_string(),
                latest.release.ip_type.to_string(),
                latest.release.maturity.clone(),
            ),
            Err(_) => ("-".to_string(), String::new(), String::new()),
        };
        table.push([
            ip.name.to_string(),
            version,
            ip.category.clone(),
            ip.technology.clone(),
            ip_type,
            maturity,
            ip.license.clone(),
        ]);
    }

    println!();
    table.print();
    println!();
    println!("  {}", format!("{} IPs", table.len()).dark_grey());
    Ok(())
}
