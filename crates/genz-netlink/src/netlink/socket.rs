//! Low-level async netlink socket operations.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use super::error::Result;

/// Receive buffer size; larger than any uevent or genz reply.
const RECV_BUF_SIZE: usize = 32768;

/// Netlink protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Generic netlink
    Generic,
    /// Kobject uevent
    KobjectUevent,
}

impl Protocol {
    fn as_isize(self) -> isize {
        match self {
            Protocol::Generic => protocols::NETLINK_GENERIC,
            Protocol::KobjectUevent => protocols::NETLINK_KOBJECT_UEVENT,
        }
    }
}

/// Async netlink socket.
pub struct NetlinkSocket {
    /// The underlying async file descriptor.
    fd: AsyncFd<Socket>,
    /// Sequence number counter.
    seq: AtomicU32,
    /// Local port ID (assigned by kernel).
    pid: u32,
}

impl NetlinkSocket {
    /// Create a new netlink socket for the given protocol.
    ///
    /// The socket is always non-blocking at the OS level; blocking reads are
    /// expressed by awaiting [`recv_msg`](Self::recv_msg).
    pub fn new(protocol: Protocol) -> Result<Self> {
        let mut socket = Socket::new(protocol.as_isize())?;
        socket.set_non_blocking(true)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        if protocol == Protocol::Generic {
            // Extended ACK is optional; older kernels reject it.
            socket.set_ext_ack(true).ok();
        }

        let fd = AsyncFd::new(socket)?;
        tracing::debug!(?protocol, pid, "opened netlink socket");

        Ok(Self {
            fd,
            seq: AtomicU32::new(1),
            pid,
        })
    }

    /// Get the next sequence number.
    pub fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Get the local port ID.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Subscribe to a multicast group.
    pub fn add_membership(&mut self, group: u32) -> Result<()> {
        self.fd.get_mut().add_membership(group)?;
        Ok(())
    }

    /// Send a message.
    pub async fn send(&self, msg: &[u8]) -> Result<()> {
        loop {
            let mut guard = self.fd.ready(Interest::WRITABLE).await?;

            match guard.try_io(|inner| inner.get_ref().send(msg, 0)) {
                Ok(result) => {
                    result?;
                    return Ok(());
                }
                Err(_would_block) => continue,
            }
        }
    }

    /// Receive a message, waiting until one is available.
    pub async fn recv_msg(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);

        loop {
            let mut guard = self.fd.ready(Interest::READABLE).await?;

            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, 0)) {
                Ok(result) => {
                    let n = result?;
                    tracing::trace!(bytes = n, "received netlink datagram");
                    return Ok(buf.to_vec());
                }
                Err(_would_block) => continue,
            }
        }
    }

    /// Receive a message if one is already queued.
    ///
    /// Returns `Ok(None)` instead of waiting when the receive queue is empty.
    pub fn try_recv_msg(&self) -> Result<Option<Vec<u8>>> {
        let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);

        match self.fd.get_ref().recv(&mut buf, 0) {
            Ok(n) => {
                tracing::trace!(bytes = n, "received netlink datagram");
                Ok(Some(buf.to_vec()))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
