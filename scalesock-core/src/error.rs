//! Scalesock Error Types
//!
//! One error enum for every socket, pattern and distributor operation.

use std::io;
use thiserror::Error;

use crate::options::OptionLevel;
use crate::pipe::PipeId;
use crate::socket_type::{Domain, SocketType};

/// Main error type for socket operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocketError {
    /// The pattern never services this operation
    #[error("{operation} is not supported by {socket_type} sockets")]
    NotSupported {
        socket_type: SocketType,
        operation: &'static str,
    },

    /// Argument rejected by the pattern or the shell
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Option is not part of the addressed option space
    #[error("Unknown option {option} at level {level}")]
    UnknownOption { level: OptionLevel, option: i32 },

    /// Event the pattern can never legally receive (framework misuse)
    #[error("Protocol violation on {socket_type} socket: {reason}")]
    ProtocolViolation {
        socket_type: SocketType,
        reason: String,
    },

    /// Allocation failure while accepting a new pipe
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Transport referenced a pipe that was never attached
    #[error("Unknown pipe {0}")]
    UnknownPipe(PipeId),

    /// Transport attached the same pipe twice
    #[error("Pipe {0} is already attached")]
    PipeAlreadyAttached(PipeId),

    /// No pattern registered for this domain and type
    #[error("No {socket_type} pattern registered in domain {domain}")]
    UnsupportedSocketType {
        domain: Domain,
        socket_type: SocketType,
    },

    /// Pattern registered twice
    #[error("{socket_type} pattern already registered in domain {domain}")]
    AlreadyRegistered {
        domain: Domain,
        socket_type: SocketType,
    },

    /// Socket was closed
    #[error("Socket terminated")]
    Terminated,
}

/// Result type alias for socket operations
pub type Result<T> = std::result::Result<T, SocketError>;

impl SocketError {
    /// Create a not-supported error for `operation` on `socket_type`
    pub const fn not_supported(socket_type: SocketType, operation: &'static str) -> Self {
        Self::NotSupported {
            socket_type,
            operation,
        }
    }

    /// Create a protocol violation error
    pub fn protocol_violation(socket_type: SocketType, reason: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            socket_type,
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Programming-invariant violations the embedding framework must not swallow.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ProtocolViolation { .. }
                | Self::ResourceExhausted(_)
                | Self::UnknownPipe(_)
                | Self::PipeAlreadyAttached(_)
        )
    }

    /// POSIX error code matching the classic C surface.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::NotSupported { .. } => 95, // ENOTSUP
            Self::InvalidArgument(_)
            | Self::AlreadyRegistered { .. }
            | Self::UnknownPipe(_)
            | Self::PipeAlreadyAttached(_) => 22, // EINVAL
            Self::UnknownOption { .. } => 92, // ENOPROTOOPT
            Self::ProtocolViolation { .. } => 71, // EPROTO
            Self::ResourceExhausted(_) => 12, // ENOMEM
            Self::UnsupportedSocketType { .. } => 93, // EPROTONOSUPPORT
            Self::Terminated => 9, // EBADF
        }
    }
}

impl From<SocketError> for io::Error {
    fn from(err: SocketError) -> Self {
        let kind = match &err {
            SocketError::NotSupported { .. } | SocketError::UnsupportedSocketType { .. } => {
                io::ErrorKind::Unsupported
            }
            SocketError::InvalidArgument(_)
            | SocketError::UnknownOption { .. }
            | SocketError::AlreadyRegistered { .. } => io::ErrorKind::InvalidInput,
            SocketError::ResourceExhausted(_) => io::ErrorKind::OutOfMemory,
            SocketError::Terminated => io::ErrorKind::NotConnected,
            SocketError::ProtocolViolation { .. }
            | SocketError::UnknownPipe(_)
            | SocketError::PipeAlreadyAttached(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
