//! Command modules - one file per CLI command

pub mod check;
pub mod cleanup;
pub mod info;
pub mod install;
pub mod install_dep;
pub mod ls;
pub mod ls_remote;
pub mod output;
pub mod package_check;
pub mod uninstall;
pub mod update;

use anyhow::{Context, Result};

use crate::GlobalOpts;
use crate::api::CatalogClient;
use crate::db::StateDb;

/// Catalog client for read-only commands that need no local state.
fn catalog(global: &GlobalOpts) -> Result<CatalogClient> {
    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    Ok(CatalogClient::new(client, &global.api_url))
}

fn open_db(global: &GlobalOpts) -> Result<StateDb> {
    StateDb::open_at(&global.state_db_path()?).context("Failed to open state database")
}
