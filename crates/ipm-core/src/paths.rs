use dirs::home_dir;
use std::path::PathBuf;

/// Returns the IPM home directory, or None if the user's home cannot be resolved.
///
/// `IPM_IPROOT` overrides the default of `~/.ipm`.
pub fn try_ipm_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("IPM_IPROOT") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".ipm"))
}

/// Returns the default IP installation root, or None if home cannot be resolved.
///
/// `IP_ROOT` overrides the default of `~/.ipm`.
pub fn try_ip_root() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("IP_ROOT") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".ipm"))
}

/// Default catalog database for the backend: `<ipm home>/catalog.db`
pub fn catalog_db_path() -> Option<PathBuf> {
    try_ipm_home().map(|h| h.join("catalog.db"))
}

/// Client state database: `<ipm home>/state.db`
pub fn state_db_path() -> Option<PathBuf> {
    try_ipm_home().map(|h| h.join("state.db"))
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}
