//! Generic Netlink plumbing for the Gen-Z command channel.
//!
//! Family IDs are handed out by the kernel at module load, so every request
//! to `genz_cmd` is preceded by a lookup through the `nlctrl` family.
//!
//! # Layers
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ GenzConnection                          │
//! │ (genz_cmd commands, FamilyBinding)      │
//! └────────────────┬────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────┐
//! │ GenlConnection                          │
//! │ (control lookup, request/ACK, cache)    │
//! └────────────────┬────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────┐
//! │ NetlinkSocket (Protocol::Generic)       │
//! └─────────────────────────────────────────┘
//! ```

mod connection;
mod header;

pub use connection::{FamilyInfo, GenlConnection};
pub use header::{GENL_HDRLEN, GenlMsgHdr};

pub mod genz;

/// Fixed ID of the `nlctrl` family that resolves every other family.
pub const GENL_ID_CTRL: u16 = 0x10;

/// `nlctrl` commands used for family lookup.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    /// Reply carrying one family description.
    NewFamily = 1,
    GetFamily = 3,
}

/// Top-level attributes of an `nlctrl` family description.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
    /// Nested list of multicast groups.
    McastGroups = 7,
}

/// Attributes inside one `CtrlAttr::McastGroups` entry.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrMcastGrp {
    Name = 1,
    Id = 2,
}
