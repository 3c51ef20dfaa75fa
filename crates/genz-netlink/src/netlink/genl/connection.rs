//! Generic Netlink connection with family resolution.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::header::{GENL_HDRLEN, GenlMsgHdr};
use super::{CtrlAttr, CtrlAttrMcastGrp, CtrlCmd, GENL_ID_CTRL};
use crate::netlink::attr::{AttrIter, get};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::message::{MessageIter, NLM_F_ACK, NLM_F_REQUEST, NlMsgError};
use crate::netlink::socket::{NetlinkSocket, Protocol};

/// Information about a Generic Netlink family.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FamilyInfo {
    /// Family name as registered by the kernel module.
    pub name: String,
    /// Dynamically assigned family ID (used as nlmsg_type).
    pub id: u16,
    /// Family version.
    pub version: u8,
    /// Header size (additional bytes after genlmsghdr).
    pub hdr_size: u32,
    /// Maximum attribute number.
    pub max_attr: u32,
    /// Multicast groups: name -> group ID.
    pub mcast_groups: HashMap<String, u32>,
}

/// Generic Netlink connection.
///
/// Provides family ID resolution and the request/ACK exchange used by
/// family-specific connections. Family IDs are cached by name; call
/// [`clear_cache`](Self::clear_cache) after a module reload.
///
/// # Example
///
/// ```rust,no_run
/// use genz_netlink::netlink::genl::GenlConnection;
///
/// # async fn example() -> genz_netlink::Result<()> {
/// let conn = GenlConnection::new()?;
///
/// let family = conn.get_family("genz_cmd").await?;
/// println!("genz_cmd family ID: {:#x}", family.id);
/// # Ok(())
/// # }
/// ```
pub struct GenlConnection {
    socket: NetlinkSocket,
    cache: RwLock<HashMap<String, FamilyInfo>>,
}

impl GenlConnection {
    /// Create a new Generic Netlink connection.
    pub fn new() -> Result<Self> {
        Ok(Self::from_socket(NetlinkSocket::new(Protocol::Generic)?))
    }

    /// Create a GENL connection from an existing socket.
    ///
    /// The socket must be a `Protocol::Generic` socket.
    pub fn from_socket(socket: NetlinkSocket) -> Self {
        Self {
            socket,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get the underlying socket.
    pub fn socket(&self) -> &NetlinkSocket {
        &self.socket
    }

    /// Get information about a Generic Netlink family.
    ///
    /// The result is cached, so subsequent calls for the same family
    /// do not require kernel communication.
    pub async fn get_family(&self, name: &str) -> Result<FamilyInfo> {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();
        if let Some(info) = cached {
            return Ok(info);
        }

        let info = self.query_family(name).await?;

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), info.clone());

        Ok(info)
    }

    /// Get the family ID for a given family name.
    pub async fn get_family_id(&self, name: &str) -> Result<u16> {
        Ok(self.get_family(name).await?.id)
    }

    /// Clear the family cache.
    ///
    /// Family IDs are reassigned when a module is unloaded and loaded again.
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Query the kernel for family information.
    async fn query_family(&self, name: &str) -> Result<FamilyInfo> {
        tracing::debug!(family = name, "resolving generic netlink family");

        let replies = self
            .command(GENL_ID_CTRL, CtrlCmd::GetFamily as u8, 1, |builder| {
                builder.append_attr_str(CtrlAttr::FamilyName as u16, name);
            })
            .await
            .map_err(|e| match e {
                Error::Kernel { errno, .. } if errno == libc::ENOENT => Error::FamilyNotFound {
                    name: name.to_string(),
                },
                other => other,
            })?;

        let info = parse_family_replies(&replies, name)?;
        tracing::debug!(family = name, id = info.id, version = info.version, "resolved family");
        Ok(info)
    }

    /// Send a GENL command and wait for its acknowledgement.
    ///
    /// Returns the payloads (GENL header included) of any replies that
    /// preceded the ACK. Most commands reply with the ACK alone, giving an
    /// empty vector.
    pub async fn command(
        &self,
        family_id: u16,
        cmd: u8,
        version: u8,
        build_attrs: impl FnOnce(&mut MessageBuilder),
    ) -> Result<Vec<Vec<u8>>> {
        let mut builder = MessageBuilder::new(family_id, NLM_F_REQUEST | NLM_F_ACK);
        builder.append_bytes(GenlMsgHdr::new(cmd, version).as_bytes());
        build_attrs(&mut builder);
        builder.set_pid(self.socket.pid());

        self.request(builder).await
    }

    /// Send a prepared request and collect replies until the kernel ACKs it.
    ///
    /// The builder's sequence number is overwritten; its port ID is left as
    /// the caller set it.
    pub async fn request(&self, mut builder: MessageBuilder) -> Result<Vec<Vec<u8>>> {
        let seq = self.socket.next_seq();
        builder.set_seq(seq);

        let msg = builder.finish();
        self.socket.send(&msg).await?;
        tracing::trace!(seq, bytes = msg.len(), "sent generic netlink request");

        let mut replies = Vec::new();
        loop {
            let data = self.socket.recv_msg().await?;
            if collect_until_ack(&data, seq, &mut replies)? {
                tracing::trace!(seq, replies = replies.len(), "request acknowledged");
                return Ok(replies);
            }
        }
    }
}

/// Scan one datagram for responses to `seq`.
///
/// Data messages are appended to `replies`. Returns `true` once the ACK
/// for `seq` is seen; a negative ACK becomes [`Error::Kernel`]. Messages
/// with other sequence numbers are ignored.
pub(crate) fn collect_until_ack(data: &[u8], seq: u32, replies: &mut Vec<Vec<u8>>) -> Result<bool> {
    for result in MessageIter::new(data) {
        let (header, payload) = result?;

        if header.nlmsg_seq != seq {
            continue;
        }

        if header.is_error() {
            let err = NlMsgError::from_bytes(payload)?;
            if !err.is_ack() {
                return Err(Error::from_errno(err.error));
            }
            return Ok(true);
        }

        if header.is_done() {
            continue;
        }

        replies.push(payload.to_vec());
    }

    Ok(false)
}

/// Parse the replies to a CTRL_CMD_GETFAMILY request.
pub(crate) fn parse_family_replies(replies: &[Vec<u8>], name: &str) -> Result<FamilyInfo> {
    let payload = replies.first().ok_or_else(|| Error::FamilyNotFound {
        name: name.to_string(),
    })?;

    if payload.len() < GENL_HDRLEN {
        return Err(Error::InvalidMessage("GENL header too short".into()));
    }

    parse_family_attrs(&payload[GENL_HDRLEN..])
}

/// Parse family attributes from a CTRL_CMD_GETFAMILY response.
fn parse_family_attrs(data: &[u8]) -> Result<FamilyInfo> {
    let mut name = String::new();
    let mut id: Option<u16> = None;
    let mut version: u8 = 0;
    let mut hdr_size: u32 = 0;
    let mut max_attr: u32 = 0;
    let mut mcast_groups = HashMap::new();

    for (attr_type, payload) in AttrIter::new(data) {
        match attr_type {
            t if t == CtrlAttr::FamilyId as u16 => id = Some(get::u16_ne(payload)?),
            t if t == CtrlAttr::FamilyName as u16 => name = get::string(payload)?.to_string(),
            t if t == CtrlAttr::Version as u16 => version = get::u32_ne(payload)? as u8,
            t if t == CtrlAttr::HdrSize as u16 => hdr_size = get::u32_ne(payload)?,
            t if t == CtrlAttr::MaxAttr as u16 => max_attr = get::u32_ne(payload)?,
            t if t == CtrlAttr::McastGroups as u16 => mcast_groups = parse_mcast_groups(payload)?,
            _ => {}
        }
    }

    let id = id.ok_or_else(|| Error::InvalidMessage("missing family ID".into()))?;

    Ok(FamilyInfo {
        name,
        id,
        version,
        hdr_size,
        max_attr,
        mcast_groups,
    })
}

/// Parse multicast groups from CTRL_ATTR_MCAST_GROUPS.
fn parse_mcast_groups(data: &[u8]) -> Result<HashMap<String, u32>> {
    let mut groups = HashMap::new();

    // Nested array: each entry holds a name and an id
    for (_group_idx, group_payload) in AttrIter::new(data) {
        let mut name: Option<String> = None;
        let mut grp_id: Option<u32> = None;

        for (attr_type, payload) in AttrIter::new(group_payload) {
            match attr_type {
                t if t == CtrlAttrMcastGrp::Name as u16 => {
                    name = Some(get::string(payload)?.to_string());
                }
                t if t == CtrlAttrMcastGrp::Id as u16 => {
                    grp_id = Some(get::u32_ne(payload)?);
                }
                _ => {}
            }
        }

        if let (Some(name), Some(id)) = (name, grp_id) {
            groups.insert(name, id);
        }
    }

    Ok(groups)
}
