//! Scalesock Core
//!
//! This crate contains the pattern-agnostic building blocks of a socket:
//! - Message handle with an optional pattern header (`message`)
//! - Pipe handles, transport backend trait and typed per-pipe slots (`pipe`)
//! - Fan-out distributor over writable pipes (`dist`)
//! - The capability set every pattern implements (`protocol`)
//! - Pattern registry keyed by domain and socket type (`registry`)
//! - Socket options, events and error types (`options`, `monitor`, `error`)

#![deny(unsafe_code)]
// Allow some pedantic lints that are intentional in this crate
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
pub mod dist;
pub mod error;
pub mod message;
pub mod monitor;
pub mod options;
pub mod pipe;
pub mod protocol;
pub mod registry;
pub mod socket_type;

// Optional: a small prelude to make downstream crates ergonomic.
// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::dist::{DistToken, Distributor, PipeState, Readiness};
    pub use crate::error::{Result, SocketError};
    pub use crate::message::Message;
    pub use crate::monitor::{SocketEvent, SocketMonitor};
    pub use crate::options::{OptionLevel, OptionValue, SocketOptions};
    pub use crate::pipe::{Pipe, PipeBackend, PipeId, PipeSend, PipeSlots};
    pub use crate::protocol::Protocol;
    pub use crate::registry::{Registry, SocketTypeEntry};
    pub use crate::socket_type::{Domain, SocketType};
}
