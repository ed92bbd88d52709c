//! Shared state for catalog-backed commands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::GlobalOpts;
use crate::api::CatalogClient;
use crate::db::StateDb;

/// Groups the references every install/update operation needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub api: CatalogClient,
    pub client: reqwest::Client,
    pub state_db: PathBuf,
    pub github_token: Option<String>,
}

impl Context {
    pub fn new(global: &GlobalOpts) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api: CatalogClient::new(client.clone(), &global.api_url),
            client,
            state_db: global.state_db_path()?,
            github_token: global.github_token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn open_db(&self) -> Result<StateDb> {
        StateDb::open_at(&self.state_db).context("Failed to open state database")
    }
}
