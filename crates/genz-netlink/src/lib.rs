//! Async netlink client for the Gen-Z fabric manager.
//!
//! This crate talks to two kernel interfaces:
//!
//! - the out-of-tree `genz_cmd` Generic Netlink family, which adds, removes
//!   and symlinks fabric components ([`GenzConnection`]);
//! - the kobject uevent bus, which reports the resulting device hotplug
//!   events ([`UeventListener`]).
//!
//! # Features
//!
//! - `serde` - `Serialize` for records, commands and family info
//! - `integration` - tests that need a live kernel
//!
//! # Example
//!
//! ```rust,no_run
//! use genz_netlink::{GenzConnection, RecvMode, UeventListener};
//!
//! #[tokio::main]
//! async fn main() -> genz_netlink::Result<()> {
//!     let events = UeventListener::open(RecvMode::NonBlocking)?;
//!
//!     let conn = GenzConnection::open().await?;
//!     conn.add_component(4242, 43, [0x11u8; 16]).await?;
//!
//!     for event in events.drain(0)? {
//!         println!("{:?} {:?}", event.action(), event.devpath());
//!     }
//!     Ok(())
//! }
//! ```

pub mod netlink;

pub use netlink::genl::genz::{CommandMessage, FamilyBinding, GenzCmd, GenzConnection};
pub use netlink::{Error, ErrorKind, RecvMode, Result, UeventListener, UeventRecord};
