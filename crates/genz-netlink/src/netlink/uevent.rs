//! Kobject uevent decoding.
//!
//! A uevent datagram is a sequence of NUL-terminated tokens. Datagrams sent
//! by the kernel start with an `action@devpath` summary:
//!
//! ```text
//! add@/devices/genz1\0ACTION=add\0DEVPATH=/devices/genz1\0SUBSYSTEM=genz\0SEQNUM=12\0
//! ```
//!
//! Datagrams re-broadcast by udev start with the `libudev` tag followed by a
//! binary monitor header. That header is kept as opaque bytes; the
//! properties begin at the first `ACTION=`.

use std::collections::HashMap;

use super::error::{Error, Result};

const LIBUDEV_TAG: &[u8] = b"libudev";
const ACTION_KEY: &[u8] = b"ACTION=";

/// Where a uevent datagram came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UeventSource {
    /// Sent by the kernel (multicast group 1).
    KernelDirect,
    /// Re-broadcast by udev (multicast group 2).
    LibudevRelay,
}

/// A decoded uevent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UeventRecord {
    /// Origin of the datagram.
    pub source: UeventSource,
    /// Leading bytes before the first `KEY=VALUE` token.
    ///
    /// For kernel events this is the `action@devpath` summary; for relayed
    /// events it is the binary udev monitor header.
    pub header: Vec<u8>,
    /// Event properties.
    pub fields: HashMap<String, String>,
}

impl UeventRecord {
    /// Decode a raw datagram. Same as [`decode`].
    pub fn parse(raw: &[u8]) -> Result<Self> {
        decode(raw)
    }

    /// The header as text, if it is valid UTF-8.
    ///
    /// Always `Some` for kernel events.
    pub fn header_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.header).ok()
    }

    /// Look up a property by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn action(&self) -> Option<&str> {
        self.get("ACTION")
    }

    pub fn devpath(&self) -> Option<&str> {
        self.get("DEVPATH")
    }

    pub fn subsystem(&self) -> Option<&str> {
        self.get("SUBSYSTEM")
    }

    /// Device node name relative to `/dev`.
    pub fn devname(&self) -> Option<&str> {
        self.get("DEVNAME")
    }

    pub fn devtype(&self) -> Option<&str> {
        self.get("DEVTYPE")
    }

    pub fn driver(&self) -> Option<&str> {
        self.get("DRIVER")
    }

    /// Device major number.
    pub fn major(&self) -> Option<u32> {
        self.get("MAJOR")?.parse().ok()
    }

    /// Device minor number.
    pub fn minor(&self) -> Option<u32> {
        self.get("MINOR")?.parse().ok()
    }

    /// Kernel event sequence number.
    pub fn seqnum(&self) -> Option<u64> {
        self.get("SEQNUM")?.parse().ok()
    }

    /// Check if this is an "add" event.
    pub fn is_add(&self) -> bool {
        self.action() == Some("add")
    }

    /// Check if this is a "remove" event.
    pub fn is_remove(&self) -> bool {
        self.action() == Some("remove")
    }

    pub fn is_change(&self) -> bool {
        self.action() == Some("change")
    }
}

/// Decode a raw uevent datagram.
///
/// An empty datagram decodes to a kernel record with an empty header and no
/// properties. Fails with [`Error::MalformedEvent`] if a non-empty property
/// token does not hold exactly one `=`, if a key is empty, if a token is not
/// UTF-8, or if a relayed event carries no `ACTION=` property.
pub fn decode(raw: &[u8]) -> Result<UeventRecord> {
    let first = raw.split(|&b| b == 0).next().unwrap_or(raw);

    let (source, header, body) = if first == LIBUDEV_TAG {
        let preamble = raw.get(LIBUDEV_TAG.len() + 1..).unwrap_or_default();
        let start = find(preamble, ACTION_KEY)
            .ok_or_else(|| Error::malformed("relayed event without ACTION", first))?;
        (
            UeventSource::LibudevRelay,
            &preamble[..start],
            &preamble[start..],
        )
    } else {
        if std::str::from_utf8(first).is_err() {
            return Err(Error::malformed("header is not valid UTF-8", first));
        }
        let body = raw.get(first.len() + 1..).unwrap_or_default();
        (UeventSource::KernelDirect, first, body)
    };

    Ok(UeventRecord {
        source,
        header: header.to_vec(),
        fields: parse_fields(body)?,
    })
}

fn parse_fields(body: &[u8]) -> Result<HashMap<String, String>> {
    let mut fields = HashMap::new();

    for token in body.split(|&b| b == 0) {
        if token.is_empty() {
            continue;
        }
        let text = std::str::from_utf8(token)
            .map_err(|_| Error::malformed("token is not valid UTF-8", token))?;

        let (key, value) = text
            .split_once('=')
            .ok_or_else(|| Error::malformed("token without '='", token))?;
        if value.contains('=') {
            return Err(Error::malformed("token with more than one '='", token));
        }
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::malformed("empty key", token));
        }

        fields.insert(key.to_string(), value.trim().to_string());
    }

    Ok(fields)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fixtures;

    #[test]
    fn test_decode_kernel_event() {
        let record = decode(b"add\0ACTION=add\0DEVPATH=/x\0").unwrap();

        assert_eq!(record.source, UeventSource::KernelDirect);
        assert_eq!(record.header, b"add");
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.action(), Some("add"));
        assert_eq!(record.devpath(), Some("/x"));
    }

    #[test]
    fn test_decode_libudev_relay() {
        let record = decode(b"libudev\0\x01\x02ACTION=remove\0SEQNUM=9\0").unwrap();

        assert_eq!(record.source, UeventSource::LibudevRelay);
        assert_eq!(record.header, [0x01u8, 0x02]);
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.action(), Some("remove"));
        assert_eq!(record.seqnum(), Some(9));
        assert!(record.is_remove());
        assert!(!record.is_add());
    }

    #[test]
    fn test_decode_rejects_token_without_equals() {
        let err = decode(b"kernel\0ACTION=add\0garbage\0").unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { ref token, .. } if token == "garbage"));
        assert_eq!(err.kind(), crate::netlink::error::ErrorKind::MalformedEvent);
    }

    #[test]
    fn test_decode_rejects_empty_key() {
        assert!(matches!(
            decode(b"add@/x\0=value\0"),
            Err(Error::MalformedEvent { .. })
        ));
    }

    #[test]
    fn test_decode_relay_without_action() {
        assert!(matches!(
            decode(b"libudev\0\x01\x02SEQNUM=9\0"),
            Err(Error::MalformedEvent { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(decode(b"add@/x\0ACTION=\xff\xfe\0").is_err());
        assert!(decode(b"\xffadd\0ACTION=add\0").is_err());
    }

    #[test]
    fn test_decode_empty_datagram() {
        let record = decode(b"").unwrap();
        assert_eq!(record.source, UeventSource::KernelDirect);
        assert!(record.header.is_empty());
        assert!(record.fields.is_empty());

        assert!(matches!(decode(b"libudev"), Err(Error::MalformedEvent { .. })));
    }

    #[test]
    fn test_decode_trims_key_and_value() {
        let record = decode(b"change@/x\0 KEY = ab \0\0").unwrap();
        assert_eq!(record.get("KEY"), Some("ab"));
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn test_decode_rejects_whitespace_only_token() {
        let err = decode(b"add@/x\0ACTION=add\0   \0").unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { ref token, .. } if token == "   "));
    }

    #[test]
    fn test_decode_rejects_multiple_equals() {
        let err = decode(b"add@/x\0ACTION=add\0A=b=c\0").unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { ref token, .. } if token == "A=b=c"));
    }

    #[test]
    fn test_decode_header_only() {
        let record = decode(b"add@/devices/x").unwrap();
        assert_eq!(record.header_text(), Some("add@/devices/x"));
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_kernel_fixture() {
        let record = UeventRecord::parse(&fixtures::uevent_kernel_add()).unwrap();

        assert_eq!(record.header_text(), Some("add@/devices/genz1/0000:00:01.0"));
        assert_eq!(record.subsystem(), Some("genz"));
        assert_eq!(record.driver(), Some("genz_bridge"));
        assert_eq!(record.major(), Some(240));
        assert_eq!(record.minor(), Some(3));
        assert_eq!(record.seqnum(), Some(4711));
        assert_eq!(record.devname(), None);
        assert_eq!(record.devtype(), None);
    }

    #[test]
    fn test_libudev_fixture() {
        let record = UeventRecord::parse(&fixtures::uevent_libudev_remove()).unwrap();

        assert_eq!(record.source, UeventSource::LibudevRelay);
        assert_eq!(record.header.len(), 32);
        assert_eq!(record.header_text(), None);
        assert_eq!(record.devpath(), Some("/devices/virtual/mem/null"));
        assert_eq!(record.subsystem(), Some("mem"));
        assert_eq!(record.seqnum(), Some(9));
    }
}
