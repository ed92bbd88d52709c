//! ipm - IP package manager

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ipm_cli::{Cli, Commands, cmd};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::LsRemote {
            category,
            technology,
            include_drafts,
        } => {
            cmd::ls_remote::ls_remote(
                global,
                category.as_deref(),
                technology.as_deref(),
                include_drafts,
            )
            .await
        }
        Commands::Info { ip, include_drafts } => cmd::info::info(global, &ip, include_drafts).await,
        Commands::Install {
            ip,
            version,
            include_drafts,
            ip_root,
            overwrite,
            deps_file,
        } => {
            cmd::install::install(
                global,
                &ip,
                &version,
                include_drafts,
                &ip_root,
                overwrite,
                deps_file.as_deref(),
            )
            .await
        }
        Commands::InstallDep {
            ip_root,
            deps_file,
            overwrite,
        } => cmd::install_dep::install_dep(global, &ip_root, deps_file.as_deref(), overwrite).await,
        Commands::Uninstall {
            ip,
            ip_root,
            deps_file,
        } => cmd::uninstall::uninstall(global, &ip, &ip_root, deps_file.as_deref()),
        Commands::Ls {
            ip_root,
            category,
            technology,
        } => cmd::ls::ls(global, &ip_root, category.as_deref(), technology.as_deref()),
        Commands::Check { ip } => cmd::check::check(global, ip.as_deref()).await,
        Commands::Update { ip, all } => {
            // clap guarantees exactly one of the two
            let target = if all { None } else { ip.as_deref() };
            cmd::update::update(global, target).await
        }
        Commands::Cleanup { ip_root, force } => cmd::cleanup::cleanup(global, &ip_root, force),
        Commands::Output { ip_root } => cmd::output::output(&ip_root),
        Commands::PackageCheck { name, version, url } => {
            cmd::package_check::package_check(global, &name, &version, &url).await
        }
    }
}
