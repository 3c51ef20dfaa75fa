//! Gen-Z component commands via Generic Netlink.
//!
//! The `genz_cmd` family is registered by the out-of-tree Gen-Z subsystem
//! module. Its ID is assigned when the module registers, so every
//! [`GenzConnection`] resolves it through the control family before the
//! first command is sent.
//!
//! Every command carries the same three attributes, in this order:
//!
//! | Attribute | Type | Payload        |
//! |-----------|------|----------------|
//! | `GCID`    | 1    | u32            |
//! | `CCLASS`  | 2    | u16            |
//! | `UUID`    | 3    | 16 raw bytes   |
//!
//! # Example
//!
//! ```rust,no_run
//! use genz_netlink::netlink::genl::genz::{GenzCmd, GenzConnection};
//!
//! # async fn example() -> genz_netlink::Result<()> {
//! let conn = GenzConnection::open().await?;
//! println!("genz_cmd family ID: {:#x}", conn.family_id());
//!
//! let uuid = [0x5au8; 16];
//! let msg = conn.build_command(GenzCmd::AddComponent, 4242, 43, &uuid)?;
//! conn.send(&msg).await?;
//! # Ok(())
//! # }
//! ```

mod connection;
mod types;

use std::fmt;
use std::str::FromStr;

pub use connection::{FamilyBinding, GenzConnection};
pub use types::{CommandMessage, UUID_LEN, format_uuid};

use crate::netlink::error::Error;

/// Gen-Z Generic Netlink family name.
pub const GENZ_GENL_NAME: &str = "genz_cmd";

/// Gen-Z Generic Netlink version.
pub const GENZ_GENL_VERSION: u8 = 1;

/// Gen-Z GENL commands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GenzCmd {
    AddComponent = 0,
    RemoveComponent = 1,
    SymlinkComponent = 2,
}

impl GenzCmd {
    /// All commands, in wire order.
    pub const ALL: [GenzCmd; 3] = [
        GenzCmd::AddComponent,
        GenzCmd::RemoveComponent,
        GenzCmd::SymlinkComponent,
    ];

    /// The kernel header's name for this command.
    pub fn name(self) -> &'static str {
        match self {
            GenzCmd::AddComponent => "GENZ_C_ADD_COMPONENT",
            GenzCmd::RemoveComponent => "GENZ_C_REMOVE_COMPONENT",
            GenzCmd::SymlinkComponent => "GENZ_C_SYMLINK_COMPONENT",
        }
    }

    /// Short lowercase name used on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            GenzCmd::AddComponent => "add",
            GenzCmd::RemoveComponent => "remove",
            GenzCmd::SymlinkComponent => "symlink",
        }
    }
}

impl fmt::Display for GenzCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for GenzCmd {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        GenzCmd::ALL
            .into_iter()
            .find(|cmd| *cmd as u8 == value)
            .ok_or(Error::UnknownCommand(value))
    }
}

impl FromStr for GenzCmd {
    type Err = Error;

    /// Accepts `add`, `add_component` or `GENZ_C_ADD_COMPONENT`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let bare = upper.strip_prefix("GENZ_C_").unwrap_or(upper.as_str());
        let bare = bare.strip_suffix("_COMPONENT").unwrap_or(bare);

        GenzCmd::ALL
            .into_iter()
            .find(|cmd| cmd.short_name().eq_ignore_ascii_case(bare))
            .ok_or_else(|| Error::InvalidCommandName(s.to_string()))
    }
}

impl TryFrom<&str> for GenzCmd {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Gen-Z GENL attributes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenzAttr {
    Gcid = 1,
    Cclass = 2,
    Uuid = 3,
}
