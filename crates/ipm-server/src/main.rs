//! ipm-server - IPM backend binary

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ipm_core::StoreConfig;
use ipm_core::store::CatalogHandle;
use ipm_core::validate::Validator;
use ipm_server::{Args, CatalogSource, Command, ServerConfig, config::DatabaseArgs};
use ipm_server::{AppState, create_router, open_store};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Serve(serve) => run_server(ServerConfig::from(&serve)).await,
        Command::Migrate { source, database } => run_migrate(&source, &database).await,
        Command::Validate {
            database,
            report,
            timeout_secs,
        } => run_validate(&database, report.as_deref(), timeout_secs).await,
    }
}

fn database_path(database: &DatabaseArgs) -> Result<PathBuf> {
    database
        .resolve()
        .context("Could not determine home directory; pass --database")
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let source = config
        .source
        .clone()
        .context("Could not determine home directory; pass --database or --catalog")?;

    info!(listen = %config.listen_addr, ?source, "Starting IPM backend");

    let store = open_store(&source)?;
    let state = AppState::new(store, config.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("IPM backend listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

async fn run_migrate(source: &Path, database: &DatabaseArgs) -> Result<()> {
    let db_path = database_path(database)?;
    let entries = ipm_core::migrate::load_source(source)
        .with_context(|| format!("Failed to load {}", source.display()))?;

    let handle = CatalogHandle::spawn(&StoreConfig::new(&db_path))
        .with_context(|| format!("Failed to open catalog database {}", db_path.display()))?;
    let report = ipm_core::migrate::migrate(&handle, entries).await?;
    handle.shutdown();

    println!("Migration completed into {}", db_path.display());
    println!("  migrated: {}", report.migrated);
    println!("  updated:  {}", report.updated);
    println!("  failed:   {}", report.failed.len());
    for failed in &report.failed {
        println!("    {}: {}", failed.name, failed.reason);
    }

    if report.is_clean() {
        Ok(())
    } else {
        anyhow::bail!("{} catalog entries could not be migrated", report.failed.len())
    }
}

async fn run_validate(database: &DatabaseArgs, report_path: Option<&Path>, timeout_secs: u64) -> Result<()> {
    let db_path = database_path(database)?;
    let store = open_store(&CatalogSource::Database(db_path))?;

    let validator = Validator::new(Duration::from_secs(timeout_secs))?;
    let report = validator.validate_store(store.as_ref()).await?;

    for ip in &report.ips {
        let mark = if ip.is_valid() { "ok" } else { "!!" };
        println!("[{mark}] {} ({})", ip.name, ip.repo);
        for release in &ip.releases {
            let draft = if release.draft { " (draft)" } else { "" };
            println!("       {}{draft}: {}", release.version, release.status);
        }
    }
    println!(
        "\n{} IPs checked: {} valid, {} invalid",
        report.summary.total_ips, report.summary.valid_ips, report.summary.invalid_ips
    );

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
