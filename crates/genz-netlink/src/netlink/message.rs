//! `nlmsghdr` framing shared by both the command and uevent sockets.

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Round `len` up to the 4-byte boundary netlink frames are packed on.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    (len + 3) & !3
}

/// Bytes taken by [`NlMsgHdr`] at the front of every frame.
pub const NLMSG_HDRLEN: usize = nlmsg_align(std::mem::size_of::<NlMsgHdr>());

/// `struct nlmsghdr`.
///
/// For Generic Netlink requests `nlmsg_type` carries the family ID.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlMsgHdr {
    /// Frame length, header included.
    pub nlmsg_len: u32,
    pub nlmsg_type: u16,
    pub nlmsg_flags: u16,
    pub nlmsg_seq: u32,
    /// Port ID of the sender; 0 when the kernel sends.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// A header-only frame of type `msg_type`. Sequence and port are zero.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        Self {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: flags,
            ..Self::default()
        }
    }

    /// `NLMSG_ERROR`, which also carries ACKs.
    pub fn is_error(&self) -> bool {
        self.nlmsg_type == NlMsgType::ERROR
    }

    pub fn is_done(&self) -> bool {
        self.nlmsg_type == NlMsgType::DONE
    }

    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Borrow the header at the front of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        match Self::ref_from_prefix(data) {
            Ok((header, _)) => Ok(header),
            Err(_) => Err(Error::Truncated {
                expected: NLMSG_HDRLEN,
                actual: data.len(),
            }),
        }
    }
}

/// Control message types the command channel has to recognise.
pub struct NlMsgType;

impl NlMsgType {
    /// Error report; an errno of 0 is an ACK.
    pub const ERROR: u16 = 2;
    /// Terminates a dump.
    pub const DONE: u16 = 3;
}

pub const NLM_F_REQUEST: u16 = 0x01;
/// Ask the kernel to acknowledge the request.
pub const NLM_F_ACK: u16 = 0x04;

/// Walks the frames packed into one receive buffer.
///
/// A frame whose length field is out of range yields one error and ends the
/// walk.
pub struct MessageIter<'a> {
    data: &'a [u8],
}

impl<'a> MessageIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<(&'a NlMsgHdr, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLMSG_HDRLEN {
            return None;
        }

        let header = match NlMsgHdr::from_bytes(self.data) {
            Ok(header) => header,
            Err(e) => return Some(Err(e)),
        };

        let len = header.nlmsg_len as usize;
        let Some(frame) = self.data.get(..len).filter(|_| len >= NLMSG_HDRLEN) else {
            let available = self.data.len();
            self.data = &[];
            return Some(Err(Error::InvalidMessage(format!(
                "frame length {} outside buffer of {} bytes",
                len, available
            ))));
        };

        self.data = self.data.get(nlmsg_align(len)..).unwrap_or_default();
        Some(Ok((header, &frame[NLMSG_HDRLEN..])))
    }
}

/// Payload of an `NLMSG_ERROR` frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
pub struct NlMsgError {
    /// Negative errno, or 0 for an ACK.
    pub error: i32,
    /// Header of the request being answered.
    pub msg: NlMsgHdr,
}

impl NlMsgError {
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        match Self::ref_from_prefix(data) {
            Ok((payload, _)) => Ok(payload),
            Err(_) => Err(Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            }),
        }
    }

    pub fn is_ack(&self) -> bool {
        self.error == 0
    }
}
