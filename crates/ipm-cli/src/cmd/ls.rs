//! Ls command

use anyhow::Result;
use crossterm::style::Stylize;

use crate::ui::{self, Table};
use crate::{GlobalOpts, IpRootOpt};

/// List IPs installed under the IP root
pub fn ls(
    global: &GlobalOpts,
    ip_root: &IpRootOpt,
    category: Option<&str>,
    technology: Option<&str>,
) -> Result<()> {
    let db = super::open_db(global)?;
    let ip_root = ip_root.resolve()?;
    let mut installed = db.list(Some(&ip_root))?;
    installed.retain(|ip| ip.matches(category, technology));

    if installed.is_empty() {
        ui::info(&format!("No IPs installed in {}", ip_root.display()));
        ui::info("Run 'ipm ls-remote' to see what is available.");
        return Ok(());
    }

    let mut table = Table::new(&["IP", "VERSION", "TECHNOLOGY", "CATEGORY", "INSTALLED", ""]);
    for ip in &installed {
        let missing = if ip.path().is_dir() { "" } else { "missing" };
        table.push([
            ip.name.clone(),
            ip.version.clone(),
            ip.technology.clone(),
            ip.category.clone(),
            format_date(ip.installed_at),
            missing.to_string(),
        ]);
    }

    println!();
    table.print();
    println!();
    println!(
        "  {}",
        format!("{} IPs in {}", table.len(), ip_root.display()).dark_grey()
    );
    Ok(())
}

fn format_date(unix_timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(unix_timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
