//! genz send - add, remove or symlink a fabric component.

use clap::Args;
use genz_netlink::netlink::genl::genz::UUID_LEN;
use genz_netlink::{CommandMessage, GenzCmd, GenzConnection, Result};

#[derive(Args)]
pub struct SendCmd {
    /// Command: add, remove or symlink.
    #[arg(default_value = "add", value_parser = parse_cmd)]
    command: GenzCmd,

    /// Global component ID.
    #[arg(long, default_value_t = 4242)]
    gcid: u32,

    /// Component class.
    #[arg(long, default_value_t = 43)]
    cclass: u16,

    /// Component UUID as hex, hyphens optional. Random v4 if omitted.
    #[arg(long, value_parser = parse_hex)]
    uuid: Option<HexBytes>,
}

/// Raw bytes parsed from a hex argument.
#[derive(Debug, Clone)]
struct HexBytes(Vec<u8>);

impl SendCmd {
    pub async fn run(&self, json: bool) -> Result<()> {
        let uuid = match &self.uuid {
            Some(HexBytes(bytes)) => bytes.clone(),
            None => random_uuid().to_vec(),
        };

        // Validate before touching the socket.
        let msg = CommandMessage::new(self.command, self.gcid, self.cclass, uuid)?;

        let conn = GenzConnection::open().await?;
        let replies = conn.send(&msg).await?;

        if json {
            let out = serde_json::json!({
                "pid": msg.process_id(),
                "command": msg.cmd().name(),
                "gcid": msg.gcid(),
                "cclass": msg.cclass(),
                "uuid": msg.uuid_string(),
                "family": conn.binding(),
                "replies": replies.len(),
            });
            println!("{}", out);
        } else {
            println!("pid {} uuid {}", msg.process_id(), msg.uuid_string());
            println!(
                "{} gcid {} cclass {} -> {} (id {:#x}): ack, {} replies",
                msg.cmd(),
                msg.gcid(),
                msg.cclass(),
                conn.binding().name,
                conn.family_id(),
                replies.len()
            );
        }

        Ok(())
    }
}

fn parse_cmd(s: &str) -> std::result::Result<GenzCmd, String> {
    s.parse().map_err(|e: genz_netlink::Error| e.to_string())
}

/// Parse hex digits into bytes. Length is checked when the message is built.
fn parse_hex(s: &str) -> std::result::Result<HexBytes, String> {
    let digits: Vec<u8> = s.bytes().filter(|&b| b != b'-').collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in '{}'", s));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).map_err(|_| format!("invalid hex in '{}'", s))?;
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex in '{}'", s))
        })
        .collect::<std::result::Result<_, _>>()
        .map(HexBytes)
}

/// Random RFC 4122 version 4 UUID.
fn random_uuid() -> [u8; UUID_LEN] {
    let mut uuid: [u8; UUID_LEN] = rand::random();
    uuid[6] = (uuid[6] & 0x0f) | 0x40;
    uuid[8] = (uuid[8] & 0x3f) | 0x80;
    uuid
}
