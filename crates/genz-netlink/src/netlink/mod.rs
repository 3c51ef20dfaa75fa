//! Netlink protocol support for the Gen-Z command family and kobject uevents.
//!
//! # Sending a command
//!
//! ```rust,no_run
//! use genz_netlink::netlink::genl::genz::{GenzCmd, GenzConnection};
//!
//! # async fn example() -> genz_netlink::Result<()> {
//! let conn = GenzConnection::open().await?;
//! let msg = conn.build_command(GenzCmd::RemoveComponent, 4242, 43, [0u8; 16])?;
//! conn.send(&msg).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Watching uevents
//!
//! ```rust,no_run
//! use genz_netlink::netlink::{RecvMode, UeventListener};
//!
//! # fn example() -> genz_netlink::Result<()> {
//! let listener = UeventListener::open(RecvMode::NonBlocking)?;
//! for event in listener.drain(0)? {
//!     println!("{:?} {:?}", event.action(), event.devpath());
//! }
//! # Ok(())
//! # }
//! ```

pub mod attr;
mod builder;
mod error;
#[cfg(test)]
mod fixtures;
pub mod genl;
pub mod listener;
pub mod message;
mod socket;
pub mod uevent;

pub use attr::{AttrIter, NlAttr};
pub use builder::MessageBuilder;
pub use error::{Error, ErrorKind, Result};
pub use listener::{CloseHandle, DatagramSource, RecvMode, UeventListener};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use socket::{NetlinkSocket, Protocol};
pub use uevent::{UeventRecord, UeventSource, decode};
