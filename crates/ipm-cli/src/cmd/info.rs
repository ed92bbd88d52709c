//! Info command

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use ipm_core::resolver;
use ipm_schema::{IpRecord, LATEST};

use crate::GlobalOpts;
use crate::ui::Table;

/// Show an IP's details and every release the backend exposes
pub async fn info(global: &GlobalOpts, name: &str, include_drafts: bool) -> Result<()> {
    let api = super::catalog(global)?;
    let ip = api
        .get_ip(name, include_drafts)
        .await
        .with_context(|| format!("Failed to fetch '{name}'"))?;

    println!();
    println!("  {}", ip.name.as_str().cyan().bold());
    if !ip.description.is_empty() {
        println!("  {}", ip.description);
    }
    println!();
    print_fields(&ip);

    if ip.releases.is_empty() {
        println!();
        println!("  {}", "No releases available".dark_grey());
        return Ok(());
    }

    println!();
    releases_table(&ip, include_drafts).print();
    Ok(())
}

fn print_fields(ip: &IpRecord) {
    let tags = ip.tags.join(", ");
    let fields = [
        ("Repository", ip.repo.as_str()),
        ("Owner", ip.owner.as_str()),
        ("Author", ip.author.as_str()),
        ("Email", ip.email.as_str()),
        ("Category", ip.category.as_str()),
        ("Technology", ip.technology.as_str()),
        ("License", ip.license.as_str()),
        ("Tags", tags.as_str()),
    ];

    let lw = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        println!("  {}  {value}", format!("{label:<lw$}").dark_grey());
    }
}

fn releases_table(ip: &IpRecord, include_drafts: bool) -> Table {
    let latest = resolver::resolve(ip, LATEST, include_drafts)
        .ok()
        .map(|r| r.version.clone());

    let mut table = Table::new(&[
        "VERSION", "DATE", "TYPE", "MATURITY", "BUS", "CELLS", "CLOCK", "SIZE", "",
    ]);
    for (version, release) in &ip.releases {
        let mut notes = Vec::new();
        if latest.as_ref() == Some(version) {
            notes.push("latest");
        }
        if release.draft {
            notes.push("draft");
        }

        let size = match (release.width, release.height) {
            (Some(w), Some(h)) => format!("{w}x{h} µm"),
            _ => String::new(),
        };
        table.push([
            version.to_string(),
            release.date.to_string(),
            release.ip_type.to_string(),
            release.maturity.clone(),
            release.bus.join(","),
            release.cell_count.map(|c| c.to_string()).unwrap_or_default(),
            release
                .clock_freq_mhz
                .map(|f| format!("{f} MHz"))
                .unwrap_or_default(),
            size,
            notes.join(", "),
        ]);
    }
    table
}
