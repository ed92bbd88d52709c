//! `dependencies.json`: the IPs a design depends on, pinned by version.
//!
//! ```json
//! {"IP": [{"name": "EF_AES", "version": "v1.1.0", "technology": "sky130"}]}
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEPENDENCIES_FILE_NAME: &str = "dependencies.json";

#[derive(Error, Debug)]
pub enum DepsError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a valid dependencies file: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub technology: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepsFile {
    #[serde(rename = "IP", default)]
    pub ips: Vec<Dependency>,
}

/// Location of `dependencies.json` inside `dir`.
pub fn deps_path(dir: &Path) -> PathBuf {
    dir.join(DEPENDENCIES_FILE_NAME)
}

impl DepsFile {
    /// Read the file at `path`.
    pub fn load(path: &Path) -> Result<Self, DepsError> {
        let content = std::fs::read_to_string(path).map_err(|source| DepsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| DepsError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the file at `path`, or start an empty one if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, DepsError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), DepsError> {
        let io_err = |source| DepsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| DepsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// Pin `dep`, replacing any earlier pin of the same IP.
    pub fn upsert(&mut self, dep: Dependency) {
        match self.ips.iter_mut().find(|d| d.name == dep.name) {
            Some(existing) => *existing = dep,
            None => self.ips.push(dep),
        }
    }

    /// Drop the pin for `name`. Returns whether one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.ips.len();
        self.ips.retain(|d| d.name != name);
        self.ips.len() != before
    }
}

/// Load, modify and write back `dependencies.json` in `dir`.
pub fn update_in(dir: &Path, f: impl FnOnce(&mut DepsFile)) -> Result<(), DepsError> {
    let path = deps_path(dir);
    let mut deps = DepsFile::load_or_default(&path)?;
    f(&mut deps);
    deps.save(&path)
}
