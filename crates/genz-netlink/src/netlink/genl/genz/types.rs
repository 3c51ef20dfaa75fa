//! Gen-Z command message and its wire encoding.

use std::fmt::Write as _;

use super::{GENZ_GENL_VERSION, GenzAttr, GenzCmd};
use crate::netlink::attr::{AttrIter, get};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::genl::header::{GENL_HDRLEN, GenlMsgHdr};
use crate::netlink::message::{NLM_F_ACK, NLM_F_REQUEST, NLMSG_HDRLEN, NlMsgHdr};

/// Size of the UUID attribute payload.
pub const UUID_LEN: usize = 16;

/// A fully validated `genz_cmd` request.
///
/// Built once per send; the three attributes always go on the wire as
/// GCID, CCLASS, UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommandMessage {
    cmd: GenzCmd,
    process_id: u32,
    gcid: u32,
    cclass: u16,
    uuid: [u8; UUID_LEN],
}

impl CommandMessage {
    /// Build a command for the current process.
    ///
    /// `cmd` may be a [`GenzCmd`], its wire number or its name. Fails with a
    /// validation error if the command is unknown or `uuid` is not exactly
    /// 16 bytes.
    pub fn new<C>(cmd: C, gcid: u32, cclass: u16, uuid: impl AsRef<[u8]>) -> Result<Self>
    where
        C: TryInto<GenzCmd>,
        Error: From<C::Error>,
    {
        let cmd = cmd.try_into()?;
        let uuid = uuid.as_ref();
        let uuid: [u8; UUID_LEN] = uuid
            .try_into()
            .map_err(|_| Error::InvalidUuidLength { len: uuid.len() })?;

        Ok(Self {
            cmd,
            process_id: std::process::id(),
            gcid,
            cclass,
            uuid,
        })
    }

    /// Override the sending process ID written to `nlmsg_pid`.
    pub fn with_process_id(mut self, process_id: u32) -> Self {
        self.process_id = process_id;
        self
    }

    pub fn cmd(&self) -> GenzCmd {
        self.cmd
    }

    pub fn process_id(&self) -> u32 {
        self.process_id
    }

    pub fn version(&self) -> u8 {
        GENZ_GENL_VERSION
    }

    /// Global component ID.
    pub fn gcid(&self) -> u32 {
        self.gcid
    }

    /// Component class.
    pub fn cclass(&self) -> u16 {
        self.cclass
    }

    pub fn uuid(&self) -> &[u8; UUID_LEN] {
        &self.uuid
    }

    /// Append the three attributes in kernel order.
    pub fn encode_attrs(&self, builder: &mut MessageBuilder) {
        builder.append_attr_u32(GenzAttr::Gcid as u16, self.gcid);
        builder.append_attr_u16(GenzAttr::Cclass as u16, self.cclass);
        builder.append_attr(GenzAttr::Uuid as u16, &self.uuid);
    }

    /// Build the complete request addressed to `family_id`.
    ///
    /// The sequence number is left for the connection to fill in.
    pub fn to_builder(&self, family_id: u16) -> MessageBuilder {
        let mut builder = MessageBuilder::new(family_id, NLM_F_REQUEST | NLM_F_ACK);
        builder.append_bytes(GenlMsgHdr::new(self.cmd as u8, GENZ_GENL_VERSION).as_bytes());
        self.encode_attrs(&mut builder);
        builder.set_pid(self.process_id);
        builder
    }

    /// Decode a complete netlink message produced by [`to_builder`](Self::to_builder).
    pub fn from_message(data: &[u8]) -> Result<Self> {
        let header = NlMsgHdr::from_bytes(data)?;
        let len = header.nlmsg_len as usize;
        if len < NLMSG_HDRLEN || len > data.len() {
            return Err(Error::Truncated {
                expected: len,
                actual: data.len(),
            });
        }
        let process_id = header.nlmsg_pid;
        Ok(Self::parse(&data[NLMSG_HDRLEN..len])?.with_process_id(process_id))
    }

    /// Decode a GENL payload (genlmsghdr followed by attributes).
    ///
    /// All three attributes must be present with their exact sizes. The
    /// process ID is not part of the payload and is left as zero.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let genl = GenlMsgHdr::from_bytes(payload)?;
        let cmd = GenzCmd::try_from(genl.cmd)?;

        let mut gcid = None;
        let mut cclass = None;
        let mut uuid = None;

        for (attr_type, data) in AttrIter::new(&payload[GENL_HDRLEN..]) {
            match attr_type {
                t if t == GenzAttr::Gcid as u16 => gcid = Some(get::u32_ne(data)?),
                t if t == GenzAttr::Cclass as u16 => cclass = Some(get::u16_ne(data)?),
                t if t == GenzAttr::Uuid as u16 => uuid = Some(get::array::<UUID_LEN>(data)?),
                _ => {}
            }
        }

        let missing = |name: &str| Error::InvalidMessage(format!("missing {} attribute", name));

        Ok(Self {
            cmd,
            process_id: 0,
            gcid: gcid.ok_or_else(|| missing("GCID"))?,
            cclass: cclass.ok_or_else(|| missing("CCLASS"))?,
            uuid: uuid.ok_or_else(|| missing("UUID"))?,
        })
    }

    /// UUID in the canonical hyphenated form.
    pub fn uuid_string(&self) -> String {
        format_uuid(&self.uuid)
    }
}

/// Format 16 bytes as `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` (RFC 4122 byte order).
pub fn format_uuid(uuid: &[u8; UUID_LEN]) -> String {
    let mut out = String::with_capacity(36);
    for (i, byte) in uuid.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::NLA_HDRLEN;
    use crate::netlink::genl::genz::GenzCmd;

    const UUID: [u8; 16] = [
        0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56,
        0x78,
    ];

    #[test]
    fn test_new_accepts_any_command_form() {
        let a = CommandMessage::new(GenzCmd::AddComponent, 4242, 43, UUID).unwrap();
        let b = CommandMessage::new(0u8, 4242, 43, UUID).unwrap();
        let c = CommandMessage::new("GENZ_C_ADD_COMPONENT", 4242, 43, UUID).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.process_id(), std::process::id());
        assert_eq!(a.version(), 1);
    }

    #[test]
    fn test_new_rejects_bad_uuid() {
        for len in [0usize, 1, 15, 17, 32] {
            let err = CommandMessage::new(GenzCmd::AddComponent, 1, 1, vec![0u8; len]).unwrap_err();
            assert!(matches!(err, Error::InvalidUuidLength { len: l } if l == len));
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_new_rejects_unknown_command() {
        let err = CommandMessage::new(7u8, 1, 1, UUID).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand(7)));

        let err = CommandMessage::new("frobnicate", 1, 1, UUID).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_wire_layout() {
        let msg = CommandMessage::new(GenzCmd::RemoveComponent, 4242, 43, UUID)
            .unwrap()
            .with_process_id(777);
        let mut builder = msg.to_builder(0x18);
        builder.set_seq(5);
        let data = builder.finish();

        // nlmsghdr + genlmsghdr + u32 attr + u16 attr (padded) + 16-byte attr
        assert_eq!(data.len(), NLMSG_HDRLEN + GENL_HDRLEN + 8 + 8 + NLA_HDRLEN + 16);

        let header = NlMsgHdr::from_bytes(&data).unwrap();
        assert_eq!(header.nlmsg_type, 0x18);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST | NLM_F_ACK);
        assert_eq!(header.nlmsg_pid, 777);
        assert_eq!(header.nlmsg_seq, 5);

        let genl = &data[NLMSG_HDRLEN..NLMSG_HDRLEN + GENL_HDRLEN];
        assert_eq!(genl, &[1, 1, 0, 0]);

        let attrs: Vec<u16> = AttrIter::new(&data[NLMSG_HDRLEN + GENL_HDRLEN..])
            .map(|(t, _)| t)
            .collect();
        assert_eq!(attrs, vec![1, 2, 3]);
    }

    #[test]
    fn test_round_trip_all_commands() {
        let uuids: [[u8; 16]; 3] = [[0u8; 16], [0xffu8; 16], UUID];
        for cmd in GenzCmd::ALL {
            for uuid in uuids {
                for (gcid, cclass) in [(0u32, 0u16), (4242, 43), (u32::MAX, u16::MAX)] {
                    let msg = CommandMessage::new(cmd, gcid, cclass, uuid).unwrap();
                    let data = msg.to_builder(0x18).finish();
                    let decoded = CommandMessage::from_message(&data).unwrap();
                    assert_eq!(decoded, msg);
                    assert_eq!(
                        (decoded.cmd(), decoded.gcid(), decoded.cclass(), decoded.uuid()),
                        (cmd, gcid, cclass, &uuid)
                    );
                }
            }
        }
    }

    #[test]
    fn test_parse_missing_attribute() {
        let mut builder = MessageBuilder::new(0x18, 0);
        builder.append_bytes(GenlMsgHdr::new(0, 1).as_bytes());
        builder.append_attr_u32(GenzAttr::Gcid as u16, 1);
        builder.append_attr_u16(GenzAttr::Cclass as u16, 2);
        let data = builder.finish();

        let err = CommandMessage::from_message(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(ref m) if m.contains("UUID")));
    }

    #[test]
    fn test_parse_short_uuid_attribute() {
        let mut builder = MessageBuilder::new(0x18, 0);
        builder.append_bytes(GenlMsgHdr::new(0, 1).as_bytes());
        builder.append_attr_u32(GenzAttr::Gcid as u16, 1);
        builder.append_attr_u16(GenzAttr::Cclass as u16, 2);
        builder.append_attr(GenzAttr::Uuid as u16, &[0u8; 8]);
        let data = builder.finish();

        assert!(matches!(
            CommandMessage::from_message(&data),
            Err(Error::InvalidAttribute(_))
        ));
    }

    #[test]
    fn test_format_uuid() {
        assert_eq!(format_uuid(&UUID), "12345678-1234-5678-1234-567812345678");
    }
}
