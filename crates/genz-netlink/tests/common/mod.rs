//! Common test utilities for integration tests.

use genz_netlink::{GenzConnection, Result};

/// Check if running as root.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Open the genz_cmd channel, or `None` if the module is not loaded.
pub async fn genz_connection() -> Result<Option<GenzConnection>> {
    match GenzConnection::open().await {
        Ok(conn) => Ok(Some(conn)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Skip the test if not running as root.
#[macro_export]
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("Skipping test: requires root");
            return Ok(());
        }
    };
}

/// Open the genz_cmd channel or skip the test if the family is missing.
#[macro_export]
macro_rules! require_genz {
    () => {
        match crate::common::genz_connection().await? {
            Some(conn) => conn,
            None => {
                eprintln!("Skipping test: genz_cmd family not registered");
                return Ok(());
            }
        }
    };
}
