//! Netlink message fixtures for testing.
//!
//! Replies as the kernel sends them, so parsers can be exercised without
//! a live socket. Attribute payloads are little-endian (x86_64 captures).

use super::message::{NLMSG_HDRLEN, NlMsgHdr, NlMsgType};

/// Wrap a payload in an nlmsghdr with the given type and sequence number.
pub fn frame(msg_type: u16, seq: u32, payload: &[u8]) -> Vec<u8> {
    let mut header = NlMsgHdr::new(msg_type, 0);
    header.nlmsg_len = (NLMSG_HDRLEN + payload.len()) as u32;
    header.nlmsg_seq = seq;

    let mut data = header.as_bytes().to_vec();
    data.extend_from_slice(payload);
    data
}

/// NLMSG_ERROR carrying `error` (0 for a plain ACK).
pub fn ack(seq: u32, error: i32) -> Vec<u8> {
    let mut original = NlMsgHdr::new(0x18, 0);
    original.nlmsg_seq = seq;

    let mut payload = error.to_ne_bytes().to_vec();
    payload.extend_from_slice(original.as_bytes());
    frame(NlMsgType::ERROR, seq, &payload)
}

/// CTRL_CMD_NEWFAMILY reply for the genz module.
/// Captured after insmod; `genl ctrl list` shows ID 0x18, version 1, max attribs 3.
pub fn genz_family_reply(seq: u32) -> Vec<u8> {
    let payload = vec![
        // genlmsghdr: cmd=CTRL_CMD_NEWFAMILY (1), version=2
        0x01, 0x02, 0x00, 0x00,
        // CTRL_ATTR_FAMILY_NAME = "genz_cmd"
        0x0d, 0x00, // len = 13
        0x02, 0x00, // type = CTRL_ATTR_FAMILY_NAME (2)
        b'g', b'e', b'n', b'z', b'_', b'c', b'm', b'd', 0x00, 0x00, 0x00, 0x00,
        // CTRL_ATTR_FAMILY_ID = 0x18
        0x06, 0x00, // len = 6
        0x01, 0x00, // type = CTRL_ATTR_FAMILY_ID (1)
        0x18, 0x00, 0x00, 0x00, // id + padding
        // CTRL_ATTR_VERSION = 1
        0x08, 0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00,
        // CTRL_ATTR_HDRSIZE = 0
        0x08, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
        // CTRL_ATTR_MAXATTR = 3
        0x08, 0x00, 0x05, 0x00, 0x03, 0x00, 0x00, 0x00,
    ];
    frame(0x10, seq, &payload)
}

/// CTRL_CMD_NEWFAMILY reply for the control family itself.
/// Captured from: genl ctrl get name nlctrl
pub fn ctrl_family_reply(seq: u32) -> Vec<u8> {
    let payload = vec![
        // genlmsghdr: cmd=CTRL_CMD_NEWFAMILY (1), version=2
        0x01, 0x02, 0x00, 0x00,
        // CTRL_ATTR_FAMILY_NAME = "nlctrl"
        0x0b, 0x00, 0x02, 0x00, b'n', b'l', b'c', b't', b'r', b'l', 0x00, 0x00,
        // CTRL_ATTR_FAMILY_ID = 0x10
        0x06, 0x00, 0x01, 0x00, 0x10, 0x00, 0x00, 0x00,
        // CTRL_ATTR_VERSION = 2
        0x08, 0x00, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00,
        // CTRL_ATTR_HDRSIZE = 0
        0x08, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
        // CTRL_ATTR_MAXATTR = 10
        0x08, 0x00, 0x05, 0x00, 0x0a, 0x00, 0x00, 0x00,
        // CTRL_ATTR_MCAST_GROUPS (nested)
        0x1c, 0x00, // len = 28
        0x07, 0x80, // type = CTRL_ATTR_MCAST_GROUPS | NLA_F_NESTED
        // group #1
        0x18, 0x00, 0x01, 0x00,
        // CTRL_ATTR_MCAST_GRP_ID = 0x10
        0x08, 0x00, 0x02, 0x00, 0x10, 0x00, 0x00, 0x00,
        // CTRL_ATTR_MCAST_GRP_NAME = "notify"
        0x0b, 0x00, 0x01, 0x00, b'n', b'o', b't', b'i', b'f', b'y', 0x00, 0x00,
    ];
    frame(0x10, seq, &payload)
}

/// Kernel-originated uevent for a Gen-Z component being added.
pub fn uevent_kernel_add() -> Vec<u8> {
    b"add@/devices/genz1/0000:00:01.0\0\
      ACTION=add\0\
      DEVPATH=/devices/genz1/0000:00:01.0\0\
      SUBSYSTEM=genz\0\
      DRIVER=genz_bridge\0\
      MAJOR=240\0\
      MINOR=3\0\
      SEQNUM=4711\0"
        .to_vec()
}

/// libudev relay datagram: "libudev" tag, binary monitor header, properties.
pub fn uevent_libudev_remove() -> Vec<u8> {
    let mut data = b"libudev\0".to_vec();
    // udev_monitor_netlink_header tail: magic, header_size, offsets, filters
    data.extend_from_slice(&[
        0xfe, 0xed, 0xca, 0xfe, 0x28, 0x00, 0x00, 0x00, 0x28, 0x00, 0x00, 0x00, 0x3b, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ]);
    data.extend_from_slice(b"ACTION=remove\0DEVPATH=/devices/virtual/mem/null\0SUBSYSTEM=mem\0SEQNUM=9\0");
    data
}
