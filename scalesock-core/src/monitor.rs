//! Socket event monitoring.
//!
//! Provides an event stream for pipe lifecycle and send readiness.

use std::fmt;

use crate::pipe::PipeId;

/// Socket lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// A peer pipe was accepted by the pattern.
    PipeAttached(PipeId),

    /// A peer pipe was removed.
    PipeDetached(PipeId),

    /// Sending became possible (readiness edge).
    SendReady,

    /// The socket was closed.
    Closed,
}

impl fmt::Display for SocketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PipeAttached(id) => write!(f, "Attached {id}"),
            Self::PipeDetached(id) => write!(f, "Detached {id}"),
            Self::SendReady => f.write_str("Ready to send"),
            Self::Closed => f.write_str("Closed"),
        }
    }
}

/// Handle for receiving socket events.
pub type SocketMonitor = flume::Receiver<SocketEvent>;

/// Sender half used by the socket shell.
pub type SocketEventSender = flume::Sender<SocketEvent>;

/// Creates a new monitoring channel pair.
#[must_use]
pub fn create_monitor() -> (SocketEventSender, SocketMonitor) {
    flume::unbounded()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_event_display() {
        assert_eq!(SocketEvent::SendReady.to_string(), "Ready to send");
        assert_eq!(SocketEvent::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_monitor_channel() {
        let (sender, receiver) = create_monitor();
        sender.send(SocketEvent::SendReady).unwrap();

        let event = receiver.recv().unwrap();
        assert_eq!(event, SocketEvent::SendReady);
    }
}
