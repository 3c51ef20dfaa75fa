//! Kobject uevent listener.
//!
//! [`UeventListener`] subscribes to both uevent multicast groups and decodes
//! every datagram with [`decode`](super::uevent::decode).
//!
//! # Example
//!
//! ```rust,no_run
//! use genz_netlink::netlink::listener::{RecvMode, UeventListener};
//!
//! # async fn example() -> genz_netlink::Result<()> {
//! let mut listener = UeventListener::open(RecvMode::Blocking)?;
//! let close = listener.close_handle();
//!
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.ok();
//!     close.close();
//! });
//!
//! while let Some(event) = listener.poll().await? {
//!     println!("{:?} {:?}", event.action(), event.devpath());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::watch;

use super::error::{Error, Result};
use super::socket::{NetlinkSocket, Protocol};
use super::uevent::{UeventRecord, decode};

/// Uevents sent directly by the kernel.
pub const UEVENT_GROUP_KERNEL: u32 = 1;
/// Uevents re-broadcast by udev after rule processing.
pub const UEVENT_GROUP_LIBUDEV: u32 = 2;

/// How [`UeventListener::poll`] behaves when nothing is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecvMode {
    /// Wait until a datagram arrives or the listener is closed.
    #[default]
    Blocking,
    /// Return `Ok(None)` immediately.
    NonBlocking,
}

/// A source of raw datagrams.
///
/// Implemented by [`NetlinkSocket`]; tests substitute an in-memory queue.
pub trait DatagramSource {
    /// Wait for the next datagram.
    fn recv_datagram(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Take the next datagram if one is queued.
    fn try_recv_datagram(&self) -> Result<Option<Vec<u8>>>;
}

impl DatagramSource for NetlinkSocket {
    fn recv_datagram(&self) -> impl Future<Output = Result<Vec<u8>>> + Send {
        self.recv_msg()
    }

    fn try_recv_datagram(&self) -> Result<Option<Vec<u8>>> {
        self.try_recv_msg()
    }
}

/// Closes a [`UeventListener`] from another task.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    /// Mark the listener closed and wake any pending [`poll`](UeventListener::poll).
    pub fn close(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!("uevent listener closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Listener for kobject uevents.
pub struct UeventListener<S = NetlinkSocket> {
    source: S,
    mode: RecvMode,
    close: CloseHandle,
    closed_rx: watch::Receiver<bool>,
}

impl UeventListener<NetlinkSocket> {
    /// Open a uevent socket subscribed to the kernel and udev groups.
    pub fn open(mode: RecvMode) -> Result<Self> {
        let mut socket = NetlinkSocket::new(Protocol::KobjectUevent)?;
        socket.add_membership(UEVENT_GROUP_KERNEL)?;
        socket.add_membership(UEVENT_GROUP_LIBUDEV)?;
        tracing::debug!(?mode, pid = socket.pid(), "subscribed to uevents");
        Ok(Self::from_source(socket, mode))
    }
}

impl<S: DatagramSource> UeventListener<S> {
    /// Wrap an existing datagram source.
    pub fn from_source(source: S, mode: RecvMode) -> Self {
        let (tx, closed_rx) = watch::channel(false);
        Self {
            source,
            mode,
            close: CloseHandle { tx: Arc::new(tx) },
            closed_rx,
        }
    }

    pub fn mode(&self) -> RecvMode {
        self.mode
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Receive the next event.
    ///
    /// In [`RecvMode::Blocking`] this waits for a datagram and never returns
    /// `Ok(None)`; closing the listener ends the wait with [`Error::Closed`].
    /// In [`RecvMode::NonBlocking`] it behaves like [`try_poll`](Self::try_poll).
    pub async fn poll(&mut self) -> Result<Option<UeventRecord>> {
        self.ensure_open()?;

        match self.mode {
            RecvMode::NonBlocking => self.try_poll(),
            RecvMode::Blocking => {
                let data = tokio::select! {
                    biased;
                    _ = self.closed_rx.wait_for(|closed| *closed) => return Err(Error::Closed),
                    data = self.source.recv_datagram() => data?,
                };
                decode(&data).map(Some)
            }
        }
    }

    /// Receive an event if one is queued, without waiting.
    pub fn try_poll(&self) -> Result<Option<UeventRecord>> {
        self.ensure_open()?;

        match self.source.try_recv_datagram()? {
            Some(data) => decode(&data).map(Some),
            None => Ok(None),
        }
    }

    /// Collect queued events without waiting.
    ///
    /// Stops after `max_count` events, or when the queue is empty if
    /// `max_count` is 0. Malformed datagrams are logged and skipped.
    pub fn drain(&self, max_count: usize) -> Result<Vec<UeventRecord>> {
        self.ensure_open()?;

        let mut records = Vec::new();
        while max_count == 0 || records.len() < max_count {
            let Some(data) = self.source.try_recv_datagram()? else {
                break;
            };
            match decode(&data) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, bytes = data.len(), "skipping malformed uevent"),
            }
        }

        tracing::trace!(count = records.len(), "drained uevents");
        Ok(records)
    }

    /// Close the listener. Later operations fail with [`Error::Closed`].
    pub fn close(&self) {
        self.close.close();
    }

    /// A handle that can close this listener from another task.
    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.close.is_closed()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        Ok(())
    }
}
