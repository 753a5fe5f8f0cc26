//! # Scalesock
//!
//! Scalability-protocol sockets built from a pattern-agnostic shell and
//! pluggable messaging patterns.
//!
//! ## Architecture
//!
//! Scalesock is structured as a small **socket kernel** with clean layering:
//!
//! - **`scalesock-core`**: pipes, the fan-out distributor, the `Protocol`
//!   capability set and the pattern registry
//! - **`scalesock-protocols`**: pattern implementations (PUB)
//! - **`scalesock`**: the socket shell and in-process transport (this crate)
//!
//! ## Quick Start
//!
//! ```rust
//! use scalesock::prelude::*;
//!
//! let mut publisher = Socket::open(Domain::Sp, SocketType::Pub)?;
//! let a = publisher.connect_inproc()?;
//! let b = publisher.connect_inproc()?;
//!
//! // Fan-out: every writable subscriber gets its own reference.
//! publisher.send("hello")?;
//! assert_eq!(a.try_recv().unwrap().body(), &b"hello"[..]);
//! assert_eq!(b.try_recv().unwrap().body(), &b"hello"[..]);
//! # Ok::<(), scalesock::SocketError>(())
//! ```
//!
//! ## Delivery model
//!
//! - **Best effort**: PUB never queues for peers that are not writable yet
//! - **Non-blocking**: a full pipe leaves the writable set instead of stalling
//!   the broadcast
//! - **Zero-copy**: message bodies are refcounted `bytes::Bytes`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dev_tracing;
pub mod inproc;
pub mod socket;

// Re-export core types
pub use bytes::Bytes;
pub use scalesock_core::dist::Readiness;
pub use scalesock_core::error::{Result, SocketError};
pub use scalesock_core::message::Message;
pub use scalesock_core::monitor::{SocketEvent, SocketMonitor};
pub use scalesock_core::options::{sockopt, OptionLevel, OptionValue, SocketOptions};
pub use scalesock_core::pipe::{Pipe, PipeBackend, PipeId, PipeSend};
pub use scalesock_core::socket_type::{Domain, SocketType};
pub use socket::{registry, Socket, SocketState};

/// Convenient imports.
///
/// ```rust
/// use scalesock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::inproc::{self, InprocPeer};
    pub use crate::{
        Bytes, Domain, Message, OptionLevel, OptionValue, Readiness, Socket, SocketError,
        SocketEvent, SocketOptions, SocketType,
    };
}
