//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// IPM backend command line arguments.
#[derive(Debug, Parser)]
#[command(name = "ipm-server")]
#[command(version, about = "IPM backend - IP catalog REST API")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the catalog over HTTP
    Serve(ServeArgs),
    /// Import a catalog JSON file into the database
    Migrate {
        /// Catalog source (JSON object keyed by IP name)
        source: PathBuf,
        #[command(flatten)]
        database: DatabaseArgs,
    },
    /// Check that every release archive in the database can be downloaded
    Validate {
        #[command(flatten)]
        database: DatabaseArgs,
        /// Write the full JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct DatabaseArgs {
    /// Catalog database file [default: <ipm home>/catalog.db]
    #[arg(long, env = "IPM_DATABASE")]
    pub database: Option<PathBuf>,
}

impl DatabaseArgs {
    pub fn resolve(&self) -> Option<PathBuf> {
        self.database.clone().or_else(ipm_core::catalog_db_path)
    }
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ServeArgs {
    /// Address to listen on for HTTP requests
    #[arg(short, long, env = "IPM_LISTEN", default_value = "127.0.0.1:8000")]
    pub listen: String,

    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Serve a catalog JSON file from memory; takes precedence over --database
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,
}

/// Where the served catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Database(PathBuf),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub source: Option<CatalogSource>,
    pub request_timeout: Duration,
}

impl From<&ServeArgs> for ServerConfig {
    fn from(args: &ServeArgs) -> Self {
        let source = match &args.catalog {
            Some(file) => Some(CatalogSource::File(file.clone())),
            None => args.database.resolve().map(CatalogSource::Database),
        };

        Self {
            listen_addr: args.listen.clone(),
            source,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
            source: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let args = Args::try_parse_from(["ipm-server", "serve", "--database", "/tmp/c.db"]).unwrap();
        let Command::Serve(serve) = args.command else {
            panic!("expected serve");
        };
        let config = ServerConfig::from(&serve);
        assert_eq!(config.listen_addr, "127.0.0.1:8000");
        assert_eq!(
            config.source,
            Some(CatalogSource::Database(PathBuf::from("/tmp/c.db")))
        );
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_catalog_file_source() {
        let args =
            Args::try_parse_from(["ipm-server", "serve", "--catalog", "verified_IPs.json"]).unwrap();
        let Command::Serve(serve) = args.command else {
            panic!("expected serve");
        };
        assert_eq!(
            ServerConfig::from(&serve).source,
            Some(CatalogSource::File(PathBuf::from("verified_IPs.json")))
        );
    }

    #[test]
    fn test_validate_args() {
        let args = Args::try_parse_from([
            "ipm-server",
            "validate",
            "--database",
            "c.db",
            "--report",
            "report.json",
        ])
        .unwrap();
        let Command::Validate {
            database,
            report,
            timeout_secs,
        } = args.command
        else {
            panic!("expected validate");
        };
        assert_eq!(database.resolve(), Some(PathBuf::from("c.db")));
        assert_eq!(report, Some(PathBuf::from("report.json")));
        assert_eq!(timeout_secs, 10);
    }
}
