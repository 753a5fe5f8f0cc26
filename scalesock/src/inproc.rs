//! In-process pipe transport.
//!
//! Each pipe is a bounded `flume` channel: the socket side is a
//! [`PipeBackend`] that never blocks, the peer side an [`InprocPeer`] that
//! reads what the socket sent.
//!
//! Capacity maps onto the pipe readiness protocol:
//! - the send that fills the channel reports [`PipeSend::Release`];
//! - a send into a full channel reports [`PipeSend::Full`];
//! - a send after the peer was dropped reports [`PipeSend::Closed`].
//!
//! The socket is not told when the peer frees capacity; whoever drives the
//! event loop calls [`Socket::pipe_writable`](crate::Socket::pipe_writable)
//! after the peer drains.
//!
//! # Usage
//!
//! ```rust
//! use scalesock::{inproc, Domain, Socket, SocketType};
//!
//! let mut publisher = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
//! let peer = publisher.connect_inproc().unwrap();
//!
//! publisher.send("tick").unwrap();
//! assert_eq!(peer.try_recv().unwrap().body(), &b"tick"[..]);
//! ```

use std::sync::Arc;

use flume::{Receiver, Sender, TrySendError};
use scalesock_core::message::Message;
use scalesock_core::pipe::{Pipe, PipeBackend, PipeId, PipeSend};
use scalesock_core::socket_type::SocketType;

/// Socket side of an in-process pipe.
struct InprocPipe {
    tx: Sender<Message>,
    capacity: usize,
    peer_type: SocketType,
}

impl PipeBackend for InprocPipe {
    fn send(&self, msg: Message) -> PipeSend {
        match self.tx.try_send(msg) {
            Ok(()) if self.tx.len() >= self.capacity => PipeSend::Release,
            Ok(()) => PipeSend::Ok,
            Err(TrySendError::Full(_)) => PipeSend::Full,
            Err(TrySendError::Disconnected(_)) => PipeSend::Closed,
        }
    }

    fn peer_type(&self) -> SocketType {
        self.peer_type
    }
}

/// Peer side of an in-process pipe.
#[derive(Debug)]
pub struct InprocPeer {
    pipe_id: PipeId,
    rx: Receiver<Message>,
}

impl InprocPeer {
    /// Identity of the pipe this peer reads from.
    #[must_use]
    pub const fn pipe_id(&self) -> PipeId {
        self.pipe_id
    }

    /// Take one message if available.
    pub fn try_recv(&self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next message. `None` once the socket side is gone.
    pub async fn recv_async(&self) -> Option<Message> {
        self.rx.recv_async().await.ok()
    }

    /// Take every queued message.
    pub fn drain(&self) -> Vec<Message> {
        self.rx.drain().collect()
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// True when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Create a pipe whose peer is of type `peer_type` and holds at most
/// `capacity` messages (at least one).
pub fn pair(peer_type: SocketType, capacity: usize) -> (Pipe, InprocPeer) {
    let capacity = capacity.max(1);
    let (tx, rx) = flume::bounded(capacity);
    let pipe = Pipe::new(Arc::new(InprocPipe {
        tx,
        capacity,
        peer_type,
    }));
    let peer = InprocPeer {
        pipe_id: pipe.id(),
        rx,
    };
    (pipe, peer)
}
