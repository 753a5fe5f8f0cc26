//! # Scalesock Protocols
//!
//! Socket pattern implementations plugged into the `scalesock-core`
//! capability set:
//! - **PUB**: one-way fan-out to every writable subscriber
//!
//! Patterns are pure state machines over pipes handed in by the socket shell;
//! they never perform I/O themselves.
//!
//! ## Quick Start
//!
//! ```rust
//! use scalesock_core::protocol::Protocol;
//! use scalesock_core::registry::Registry;
//! use scalesock_core::socket_type::{Domain, SocketType};
//!
//! let registry = Registry::with_entries(scalesock_protocols::builtin()).unwrap();
//! let publisher = registry.create(Domain::Sp, SocketType::Pub).unwrap();
//! assert_eq!(publisher.socket_type(), SocketType::Pub);
//! ```

// Allow some pedantic lints
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod publisher;

pub use publisher::Publisher;

use scalesock_core::registry::SocketTypeEntry;

/// Every pattern this crate provides, ready for a [`Registry`](scalesock_core::registry::Registry).
pub fn builtin() -> [SocketTypeEntry; 1] {
    [Publisher::entry()]
}
