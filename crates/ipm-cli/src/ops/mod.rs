//! Operations behind the install-side commands.

pub mod context;
pub mod deps;
pub mod download;
pub mod extract;
pub mod install;

pub use context::Context;
pub use install::{InstallError, InstallRequest, install_ip, uninstall_files};
