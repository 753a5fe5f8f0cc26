//! The capability set every socket pattern implements.
//!
//! The socket shell owns one `Box<dyn Protocol>` chosen at open time from the
//! [`Registry`](crate::registry::Registry) and forwards application calls and
//! transport events to it. Patterns never see other patterns.
//!
//! Outcomes:
//! - `Ok(..)`: success (including "delivered to nobody" for broadcasts).
//! - `NotSupported`, `InvalidArgument`, `UnknownOption`: permanent rejections,
//!   never retried.
//! - Errors where [`SocketError::is_fatal`](crate::error::SocketError::is_fatal)
//!   holds: invariant breaks the shell escalates.

use bytes::Bytes;

use crate::dist::Readiness;
use crate::error::{Result, SocketError};
use crate::message::Message;
use crate::options::{OptionLevel, OptionValue};
use crate::pipe::Pipe;
use crate::socket_type::SocketType;

/// Pattern-specific behavior plugged into a socket shell.
pub trait Protocol: Send {
    /// Pattern identifier.
    fn socket_type(&self) -> SocketType;

    /// A peer connected. The pattern may refuse it and allocates its
    /// per-pipe state on acceptance.
    fn add(&mut self, pipe: &Pipe) -> Result<()>;

    /// A peer disconnected. Per-pipe state is released.
    fn rm(&mut self, pipe: &Pipe);

    /// Inbound data is available on `pipe`.
    fn pipe_in(&mut self, pipe: &Pipe) -> Result<Readiness>;

    /// `pipe` can accept outbound data again.
    fn pipe_out(&mut self, pipe: &Pipe) -> Result<Readiness>;

    /// Send one application message.
    fn send(&mut self, msg: Message) -> Result<()>;

    /// Receive one application message.
    fn recv(&mut self) -> Result<Message>;

    /// Set an option in this pattern's option space.
    fn set_option(&mut self, option: i32, _value: &OptionValue) -> Result<()> {
        Err(SocketError::UnknownOption {
            level: OptionLevel::Protocol(self.socket_type()),
            option,
        })
    }

    /// Read an option from this pattern's option space.
    fn get_option(&self, option: i32) -> Result<OptionValue> {
        Err(SocketError::UnknownOption {
            level: OptionLevel::Protocol(self.socket_type()),
            option,
        })
    }

    /// Attach routing metadata to an outgoing message.
    fn set_header(&self, msg: &mut Message, hdr: &[u8]) -> Result<()>;

    /// Read routing metadata from a message.
    fn get_header(&self, msg: &Message) -> Bytes;

    /// Release pattern state. Every pipe has been removed via [`rm`](Self::rm).
    fn terminate(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal pattern relying on the default option handlers.
    struct Null;

    impl Protocol for Null {
        fn socket_type(&self) -> SocketType {
            SocketType::Pair
        }
        fn add(&mut self, _pipe: &Pipe) -> Result<()> {
            Ok(())
        }
        fn rm(&mut self, _pipe: &Pipe) {}
        fn pipe_in(&mut self, _pipe: &Pipe) -> Result<Readiness> {
            Ok(Readiness::Steady)
        }
        fn pipe_out(&mut self, _pipe: &Pipe) -> Result<Readiness> {
            Ok(Readiness::Steady)
        }
        fn send(&mut self, _msg: Message) -> Result<()> {
            Ok(())
        }
        fn recv(&mut self) -> Result<Message> {
            Err(SocketError::not_supported(SocketType::Pair, "recv"))
        }
        fn set_header(&self, _msg: &mut Message, _hdr: &[u8]) -> Result<()> {
            Ok(())
        }
        fn get_header(&self, _msg: &Message) -> Bytes {
            Bytes::new()
        }
    }

    #[test]
    fn default_options_are_unknown() {
        let mut proto: Box<dyn Protocol> = Box::new(Null);
        let expected = SocketError::UnknownOption {
            level: OptionLevel::Protocol(SocketType::Pair),
            option: 3,
        };
        assert_eq!(proto.set_option(3, &OptionValue::Int(1)), Err(expected.clone()));
        assert_eq!(proto.get_option(3), Err(expected));
        proto.terminate();
    }
}
