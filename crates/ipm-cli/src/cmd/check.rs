//! Check command

use anyhow::{Result, bail};
use crossterm::style::Stylize;
use ipm_schema::LATEST;

use crate::GlobalOpts;
use crate::api::{ApiError, CatalogClient};
use crate::db::{InstalledIp, StateDb};
use crate::ui::{self, Table};

/// An installed IP next to what the backend currently calls `latest`.
#[derive(Debug)]
pub struct Comparison {
    pub installed: InstalledIp,
    pub latest: Result<String, ApiError>,
}

impl Comparison {
    pub fn is_outdated(&self) -> bool {
        matches!(&self.latest, Ok(v) if *v != self.installed.version)
    }
}

/// Installed records for `name`, or every record when `None`.
pub(crate) fn installed(db: &StateDb, name: Option<&str>) -> Result<Vec<InstalledIp>> {
    let records = match name {
        Some(name) => db.find_by_name(name)?,
        None => db.list(None)?,
    };
    if let (Some(name), true) = (name, records.is_empty()) {
        bail!("{name} is not installed");
    }
    Ok(records)
}

pub(crate) async fn compare(api: &CatalogClient, records: Vec<InstalledIp>) -> Vec<Comparison> {
    let mut out = Vec::with_capacity(records.len());
    for installed in records {
        let latest = api
            .download_info(&installed.name, LATEST, false)
            .await
            .map(|d| d.version.to_string());
        out.push(Comparison { installed, latest });
    }
    out
}

/// Compare installed versions against the remote `latest`
pub async fn check(global: &GlobalOpts, name: Option<&str>) -> Result<()> {
    let db = super::open_db(global)?;
    let records = installed(&db, name)?;
    if records.is_empty() {
        ui::info("No IPs installed.");
        return Ok(());
    }

    let api = super::catalog(global)?;
    let results = compare(&api, records).await;

    let mut table = Table::new(&["IP", "INSTALLED", "LATEST", "IP ROOT", "STATUS"]);
    for c in &results {
        let (latest, status) = match &c.latest {
            Ok(v) if c.is_outdated() => (v.clone(), "update available".to_string()),
            Ok(v) => (v.clone(), "up to date".to_string()),
            Err(e) => ("-".to_string(), e.to_string()),
        };
        table.push([
            c.installed.name.clone(),
            c.installed.version.clone(),
            latest,
            c.installed.ip_root.display().to_string(),
            status,
        ]);
    }

    println!();
    table.print();
    println!();

    let outdated = results.iter().filter(|c| c.is_outdated()).count();
    if outdated > 0 {
        println!(
            "  {}",
            format!("{outdated} update(s) available; run 'ipm update --all'").yellow()
        );
    } else {
        ui::success("Everything is up to date");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::path::PathBuf;

    fn comparison(installed: &str, latest: Result<&str, ApiError>) -> Comparison {
        Comparison {
            installed: InstalledIp {
                name: "EF_AES".into(),
                ip_root: PathBuf::from("/ips"),
                version: installed.into(),
                sha256: String::new(),
                technology: String::new(),
                category: String::new(),
                installed_at: 0,
            },
            latest: latest.map(str::to_string),
        }
    }

    #[test]
    fn test_is_outdated() {
        assert!(comparison("v1.0.0", Ok("v1.1.0")).is_outdated());
        assert!(!comparison("v1.1.0", Ok("v1.1.0")).is_outdated());

        let err = ApiError::Api {
            status: StatusCode::NOT_FOUND,
            code: "IP_NOT_FOUND".into(),
            message: "gone".into(),
        };
        assert!(!comparison("v1.0.0", Err(err)).is_outdated());
    }
}
