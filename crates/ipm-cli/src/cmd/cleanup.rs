//! Cleanup command

use std::io::Write;

use anyhow::Result;
use crossterm::style::Stylize;

use crate::ui::{self, Table};
use crate::{GlobalOpts, IpRootOpt};

/// Forget installations recorded under any other IP root
///
/// Only state records are dropped; files under other roots are left alone.
pub fn cleanup(global: &GlobalOpts, ip_root: &IpRootOpt, force: bool) -> Result<()> {
    let db = super::open_db(global)?;
    let ip_root = ip_root.resolve()?;
    let stale = db.list_outside(&ip_root)?;

    if stale.is_empty() {
        ui::info("Nothing to clean up.");
        return Ok(());
    }

    let mut table = Table::new(&["IP", "VERSION", "IP ROOT"]);
    for ip in &stale {
        table.push([
            ip.name.clone(),
            ip.version.clone(),
            ip.ip_root.display().to_string(),
        ]);
    }
    println!();
    table.print();

    if !force {
        println!();
        print!(
            "  {} Forget {} installation(s) outside {}? (y/N) ",
            "WARNING:".bold().yellow(),
            stale.len(),
            ip_root.display()
        );
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            ui::error("Operation cancelled");
            return Ok(());
        }
    }

    for ip in &stale {
        db.remove(&ip.name, &ip.ip_root)?;
    }
    ui::success(&format!("Removed {} stale record(s)", stale.len()));
    Ok(())
}
