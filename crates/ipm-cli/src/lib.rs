//! ipm - IP package manager
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Client for the IPM backend: browse the catalog of verified hardware IPs
//! and install them into a local IP root.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.ipm/                 # ipm-iproot: client state
//! └── state.db            # installed IPs, per IP root
//!
//! <ip-root>/              # where IPs land (defaults to ~/.ipm as well)
//! ├── dependencies.json   # pinned {name, version, technology} per IP
//! └── <ip>/               # one directory per installed IP
//! ```

pub mod api;
pub mod cmd;
pub mod ops;
pub mod store;
pub mod ui;

pub use crate::store::db;

pub use ipm_core::USER_AGENT;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ipm")]
#[command(author, version, about = "ipm - install and manage verified hardware IPs")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalOpts {
    /// Base URL of the IPM backend
    #[arg(
        long,
        global = true,
        env = "IPM_API_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    pub api_url: String,

    /// Directory holding ipm's own state [default: ~/.ipm]
    #[arg(long, global = true, env = "IPM_IPROOT")]
    pub ipm_iproot: Option<PathBuf>,

    /// Token sent when downloading from github.com
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true, hide = true)]
    pub github_token: Option<String>,
}

impl GlobalOpts {
    pub fn state_db_path(&self) -> Result<PathBuf> {
        match &self.ipm_iproot {
            Some(dir) => Ok(dir.join("state.db")),
            None => ipm_core::state_db_path()
                .context("Could not determine home directory; pass --ipm-iproot"),
        }
    }
}

/// IP installation root, shared by the commands that touch installed files.
#[derive(Debug, Clone, Args)]
pub struct IpRootOpt {
    /// IP installation path [default: $IP_ROOT, otherwise ~/.ipm]
    #[arg(long, env = "IP_ROOT")]
    pub ip_root: Option<PathBuf>,
}

impl IpRootOpt {
    pub fn resolve(&self) -> Result<PathBuf> {
        self.ip_root
            .clone()
            .or_else(ipm_core::try_ip_root)
            .context("Could not determine home directory; pass --ip-root")
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all verified IPs in the remote catalog
    LsRemote {
        /// Only IPs of this category (digital, comm, analog, dataconv)
        #[arg(long)]
        category: Option<String>,
        /// Only IPs for this technology (sky130, gf180mcuC)
        #[arg(long)]
        technology: Option<String>,
        /// Show draft releases too
        #[arg(long)]
        include_drafts: bool,
    },
    /// Show all releases and details of an IP
    Info {
        /// IP name
        ip: String,
        /// Show draft releases too
        #[arg(long)]
        include_drafts: bool,
    },
    /// Install one of the verified IPs
    Install {
        /// IP name
        ip: String,
        /// Release to install
        #[arg(long, default_value = ipm_schema::LATEST)]
        version: String,
        /// Allow installing draft releases
        #[arg(long)]
        include_drafts: bool,
        #[command(flatten)]
        ip_root: IpRootOpt,
        /// Replace an existing, non-empty IP directory
        #[arg(long)]
        overwrite: bool,
        /// Directory of the dependencies.json to update [default: the IP root]
        #[arg(long)]
        deps_file: Option<PathBuf>,
    },
    /// Install every IP pinned in dependencies.json
    InstallDep {
        #[command(flatten)]
        ip_root: IpRootOpt,
        /// Directory of the dependencies.json to read [default: the IP root]
        #[arg(long)]
        deps_file: Option<PathBuf>,
        /// Replace existing, non-empty IP directories
        #[arg(long)]
        overwrite: bool,
    },
    /// Uninstall an installed IP
    Uninstall {
        /// IP name
        ip: String,
        #[command(flatten)]
        ip_root: IpRootOpt,
        /// Directory of the dependencies.json to update [default: the IP root]
        #[arg(long)]
        deps_file: Option<PathBuf>,
    },
    /// List installed IPs
    Ls {
        #[command(flatten)]
        ip_root: IpRootOpt,
        /// Only IPs of this category (digital, comm, analog, dataconv)
        #[arg(long)]
        category: Option<String>,
        /// Only IPs for this technology (sky130, gf180mcuC)
        #[arg(long)]
        technology: Option<String>,
    },
    /// Check installed IPs for newer releases
    Check {
        /// Only check this IP
        #[arg(long)]
        ip: Option<String>,
    },
    /// Update installed IPs to their latest release
    Update {
        /// IP to update
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        ip: Option<String>,
        /// Update every installed IP
        #[arg(long)]
        all: bool,
    },
    /// Forget installations recorded under a different IP root
    Cleanup {
        #[command(flatten)]
        ip_root: IpRootOpt,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Print the IP installation path
    Output {
        #[command(flatten)]
        ip_root: IpRootOpt,
    },
    /// Check that a release of an IP repo is ready to submit
    PackageCheck {
        /// IP name, as used for `<name>.json`
        #[arg(long)]
        name: String,
        /// Release tag to check
        #[arg(long)]
        version: String,
        /// Repository URL, e.g. github.com/efabless/EF_AES
        #[arg(long)]
        url: String,
    },
}
