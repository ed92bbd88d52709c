//! Output command

use anyhow::Result;

use crate::IpRootOpt;

/// Print the IP installation root
pub fn output(ip_root: &IpRootOpt) -> Result<()> {
    println!("{}", ip_root.resolve()?.display());
    Ok(())
}
