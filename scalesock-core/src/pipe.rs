//! Pipe handles and per-pipe pattern state.
//!
//! A pipe is one logical connection to a peer. The transport owns the
//! connection and exposes it through a [`PipeBackend`]; sockets and patterns
//! only ever see the cloneable [`Pipe`] handle.
//!
//! Patterns attach their own per-pipe record through [`PipeSlots`], a typed
//! slot map keyed by [`PipeId`]. The slot is filled when the pipe is attached
//! and emptied when it is detached.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;

use crate::error::{Result, SocketError};
use crate::message::Message;
use crate::socket_type::SocketType;

/// Opaque, process-unique pipe identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipeId(u64);

impl PipeId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1); // reserve 0
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipe#{}", self.0)
    }
}

/// Outcome of handing one message to a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeSend {
    /// Accepted; the pipe can take more.
    Ok,
    /// Accepted; the pipe is now at capacity and must not be written until it
    /// signals writability again.
    Release,
    /// Not accepted: the pipe was already at capacity.
    Full,
    /// Not accepted: the peer is gone. A detach will follow.
    Closed,
}

impl PipeSend {
    /// Whether the message reached the pipe.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Ok | Self::Release)
    }

    /// Whether the pipe remains writable after this send.
    #[must_use]
    pub const fn keeps_writable(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Transport side of a pipe.
///
/// Implementations must never block: capacity limits are reported through
/// [`PipeSend`] instead.
pub trait PipeBackend: Send + Sync + 'static {
    /// Hand one message to the transport.
    fn send(&self, msg: Message) -> PipeSend;

    /// Take one inbound message, if any.
    fn recv(&self) -> Option<Message> {
        None
    }

    /// Socket type of the peer on the other end.
    fn peer_type(&self) -> SocketType;
}

/// Cloneable, non-owning handle to a transport pipe.
#[derive(Clone)]
pub struct Pipe {
    id: PipeId,
    backend: Arc<dyn PipeBackend>,
}

impl Pipe {
    /// Wrap a transport backend under a fresh [`PipeId`].
    pub fn new(backend: Arc<dyn PipeBackend>) -> Self {
        Self {
            id: PipeId::next(),
            backend,
        }
    }

    /// Pipe identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PipeId {
        self.id
    }

    /// Socket type of the remote peer.
    #[must_use]
    pub fn peer_type(&self) -> SocketType {
        self.backend.peer_type()
    }

    /// Hand one message to the transport.
    #[inline]
    pub fn send(&self, msg: Message) -> PipeSend {
        self.backend.send(msg)
    }

    /// Take one inbound message, if any.
    pub fn recv(&self) -> Option<Message> {
        self.backend.recv()
    }
}

impl fmt::Debug for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Pipe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Pipe {}

/// Typed per-pipe state owned by a pattern.
#[derive(Debug)]
pub struct PipeSlots<T> {
    slots: HashMap<PipeId, T>,
}

impl<T> Default for PipeSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PipeSlots<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Make room for `pipe` without filling its slot yet.
    ///
    /// After this succeeds, [`set`](Self::set) for the same pipe cannot fail.
    ///
    /// # Errors
    ///
    /// `PipeAlreadyAttached` if the slot is occupied, `ResourceExhausted` if
    /// the table cannot grow.
    pub fn reserve(&mut self, pipe: &Pipe) -> Result<()> {
        if self.slots.contains_key(&pipe.id()) {
            return Err(SocketError::PipeAlreadyAttached(pipe.id()));
        }
        self.slots
            .try_reserve(1)
            .map_err(|e| SocketError::ResourceExhausted(format!("pipe data: {e:?}")))
    }

    /// Fill the slot of a newly attached pipe.
    ///
    /// # Errors
    ///
    /// Same as [`reserve`](Self::reserve).
    pub fn set(&mut self, pipe: &Pipe, data: T) -> Result<()> {
        self.reserve(pipe)?;
        self.slots.insert(pipe.id(), data);
        Ok(())
    }

    /// Borrow the slot of an attached pipe.
    ///
    /// # Errors
    ///
    /// `UnknownPipe` if the pipe has no slot.
    pub fn get(&self, pipe: &Pipe) -> Result<&T> {
        self.slots
            .get(&pipe.id())
            .ok_or(SocketError::UnknownPipe(pipe.id()))
    }

    /// Empty the slot on detach, returning its contents.
    ///
    /// # Errors
    ///
    /// `UnknownPipe` if the pipe has no slot.
    pub fn take(&mut self, pipe: &Pipe) -> Result<T> {
        self.slots
            .remove(&pipe.id())
            .ok_or(SocketError::UnknownPipe(pipe.id()))
    }

    /// Drain every slot (used on terminate).
    pub fn drain(&mut self) -> impl Iterator<Item = (PipeId, T)> + '_ {
        self.slots.drain()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink;

    impl PipeBackend for Sink {
        fn send(&self, _msg: Message) -> PipeSend {
            PipeSend::Ok
        }

        fn peer_type(&self) -> SocketType {
            SocketType::Sub
        }
    }

    #[test]
    fn pipe_ids_are_unique() {
        let a = Pipe::new(Arc::new(Sink));
        let b = Pipe::new(Arc::new(Sink));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn slots_follow_attach_lifecycle() {
        let pipe = Pipe::new(Arc::new(Sink));
        let mut slots = PipeSlots::new();

        slots.set(&pipe, 7u32).unwrap();
        assert_eq!(
            slots.set(&pipe, 8),
            Err(SocketError::PipeAlreadyAttached(pipe.id()))
        );
        assert_eq!(*slots.get(&pipe).unwrap(), 7);

        assert_eq!(slots.take(&pipe).unwrap(), 7);
        assert!(slots.is_empty());
        assert_eq!(slots.take(&pipe), Err(SocketError::UnknownPipe(pipe.id())));
    }

    #[test]
    fn send_outcomes() {
        assert!(PipeSend::Release.is_delivered());
        assert!(!PipeSend::Release.keeps_writable());
        assert!(!PipeSend::Full.is_delivered());
        assert!(PipeSend::Ok.keeps_writable());
    }
}
