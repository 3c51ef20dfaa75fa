//! `genlmsghdr`, the 4-byte header between `nlmsghdr` and the attributes of
//! every Generic Netlink frame.
//!
//! ```text
//! nlmsghdr (16) | cmd (1) | version (1) | reserved (2) | nlattr...
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// `struct genlmsghdr`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct GenlMsgHdr {
    /// Family command, e.g. a [`GenzCmd`](super::genz::GenzCmd) value.
    pub cmd: u8,
    pub version: u8,
    /// Always zero on the wire.
    pub reserved: u16,
}

pub const GENL_HDRLEN: usize = std::mem::size_of::<GenlMsgHdr>();

impl GenlMsgHdr {
    pub const fn new(cmd: u8, version: u8) -> Self {
        Self {
            cmd,
            version,
            reserved: 0,
        }
    }

    /// Borrow the header at the front of a GENL payload.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        match Self::ref_from_prefix(data) {
            Ok((header, _)) => Ok(header),
            Err(_) => Err(Error::Truncated {
                expected: GENL_HDRLEN,
                actual: data.len(),
            }),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }
}
