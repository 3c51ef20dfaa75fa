//! Error types for netlink operations.

use std::convert::Infallible;
use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`].
///
/// Callers that only need to decide "retry, reopen or give up" can match on
/// this instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied data violates a wire constraint. Never retried.
    Validation,
    /// The kernel could not resolve the requested family or group.
    Bind,
    /// Socket-level failure, including use after close.
    Transport,
    /// The kernel answered the request with a negative acknowledgement.
    KernelRejected,
    /// A uevent datagram did not follow the `KEY=VALUE` layout.
    MalformedEvent,
}

/// Errors that can occur during netlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The socket was closed while (or before) the operation ran.
    #[error("netlink socket closed")]
    Closed,

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Generic netlink family is not registered.
    #[error("generic netlink family not found: {name} (is the module loaded?)")]
    FamilyNotFound {
        /// The family name that was looked up.
        name: String,
    },

    /// UUID attribute has the wrong size.
    #[error("invalid UUID length: expected 16 bytes, got {len}")]
    InvalidUuidLength {
        /// Length of the rejected value.
        len: usize,
    },

    /// Command number outside the family's command table.
    #[error("unknown genz command: {0}")]
    UnknownCommand(u8),

    /// Command name that does not match any known command.
    #[error("unknown genz command name: {0}")]
    InvalidCommandName(String),

    /// Uevent payload violates the `KEY=VALUE` layout.
    #[error("malformed uevent: {reason}")]
    MalformedEvent {
        /// What was wrong with the datagram.
        reason: String,
        /// The offending token, lossily decoded.
        token: String,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl Error {
    /// Create a kernel error from an errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>, token: &[u8]) -> Self {
        Self::MalformedEvent {
            reason: reason.into(),
            token: String::from_utf8_lossy(token).into_owned(),
        }
    }

    /// Get the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUuidLength { .. }
            | Self::UnknownCommand(_)
            | Self::InvalidCommandName(_) => ErrorKind::Validation,
            Self::FamilyNotFound { .. } => ErrorKind::Bind,
            Self::Kernel { .. } => ErrorKind::KernelRejected,
            Self::MalformedEvent { .. } => ErrorKind::MalformedEvent,
            Self::Io(_)
            | Self::Closed
            | Self::Truncated { .. }
            | Self::InvalidMessage(_)
            | Self::InvalidAttribute(_) => ErrorKind::Transport,
        }
    }

    /// Check if this error was caused by invalid caller input.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is a closed-socket error.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, missing family).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, libc::ENOENT | libc::ENODEV),
            Self::FamilyNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, libc::EPERM | libc::EACCES),
            Self::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}
