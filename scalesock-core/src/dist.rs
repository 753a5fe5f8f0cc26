//! Distributor: fan-out over the writable subset of attached pipes.
//!
//! Responsibilities:
//! - Track every attached pipe and the subset currently believed writable.
//! - Translate per-pipe writability into a socket-level readiness edge
//!   (writable set going from empty to non-empty).
//! - Broadcast one message to every writable pipe without blocking.
//!
//! Invariants:
//! - writable ⊆ attached after every operation.
//! - A pipe becomes writable only through `mark_writable`.
//! - A pipe that refuses a message, or reports it is now full, leaves the
//!   writable set and stays out until the transport signals it again.
//!
//! Concurrency model:
//! - Owned by one socket, driven from one event loop (`&mut self`).
//! - Backpressure is local state; one slow pipe never delays the others.

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::error::{Result, SocketError};
use crate::message::Message;
use crate::pipe::{Pipe, PipeId};

/// Membership record returned by [`Distributor::attach`].
///
/// Consumed by [`Distributor::detach`]; patterns keep it in their per-pipe slot.
#[derive(Debug)]
#[must_use = "the token is needed to detach the pipe"]
pub struct DistToken {
    id: PipeId,
}

impl DistToken {
    /// Pipe this token belongs to.
    #[must_use]
    pub const fn pipe_id(&self) -> PipeId {
        self.id
    }
}

/// Result of a readiness signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The writable set went from empty to non-empty: the socket can send.
    Rising,
    /// Nothing the socket needs to hear about.
    Steady,
}

impl Readiness {
    #[must_use]
    pub const fn is_rising(&self) -> bool {
        matches!(self, Self::Rising)
    }
}

/// Where a pipe stands relative to one distributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeState {
    /// Attached, waiting for a readiness signal.
    Blocked,
    /// Attached and eligible for the next broadcast.
    Writable,
    /// Not attached.
    Detached,
}

#[derive(Debug)]
struct Member {
    pipe: Pipe,
    writable: bool,
}

/// Per-socket outbound pipe set with fan-out delivery.
#[derive(Debug, Default)]
pub struct Distributor {
    /// Attached set
    pipes: HashMap<PipeId, Member>,

    /// Writable set, in the order pipes became writable
    out: Vec<Pipe>,
}

impl Distributor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pipe. It starts blocked until [`mark_writable`](Self::mark_writable).
    ///
    /// Room in the writable set is reserved here so `mark_writable` never
    /// allocates.
    ///
    /// # Errors
    ///
    /// `ResourceExhausted` if either set cannot grow, `PipeAlreadyAttached` if
    /// the pipe is already registered.
    pub fn attach(&mut self, pipe: &Pipe) -> Result<DistToken> {
        let id = pipe.id();
        if self.pipes.contains_key(&id) {
            return Err(SocketError::PipeAlreadyAttached(id));
        }

        self.pipes
            .try_reserve(1)
            .map_err(|e| SocketError::ResourceExhausted(format!("attached set: {e:?}")))?;
        let needed = (self.pipes.len() + 1).saturating_sub(self.out.len());
        self.out
            .try_reserve(needed)
            .map_err(|e| SocketError::ResourceExhausted(format!("writable set: {e}")))?;

        self.pipes.insert(
            id,
            Member {
                pipe: pipe.clone(),
                writable: false,
            },
        );
        trace!("[DIST] attached {} ({} total)", id, self.pipes.len());
        Ok(DistToken { id })
    }

    /// Remove a pipe from both sets.
    pub fn detach(&mut self, token: DistToken) {
        let Some(member) = self.pipes.remove(&token.id) else {
            return;
        };

        if member.writable {
            if let Some(pos) = self.out.iter().position(|p| p.id() == token.id) {
                self.out.remove(pos);
            }
        }
        trace!(
            "[DIST] detached {} (was writable: {}, {} remaining)",
            token.id,
            member.writable,
            self.pipes.len()
        );
    }

    /// Move a pipe into the writable set.
    ///
    /// Returns [`Readiness::Rising`] only when the writable set was empty
    /// before this call. Marking an already writable pipe is a no-op.
    ///
    /// # Errors
    ///
    /// `UnknownPipe` if the token was not issued by this distributor.
    pub fn mark_writable(&mut self, token: &DistToken) -> Result<Readiness> {
        let member = self
            .pipes
            .get_mut(&token.id)
            .ok_or(SocketError::UnknownPipe(token.id))?;

        if member.writable {
            return Ok(Readiness::Steady);
        }

        member.writable = true;
        self.out.push(member.pipe.clone());
        trace!("[DIST] {} writable ({} writable)", token.id, self.out.len());

        Ok(if self.out.len() == 1 {
            Readiness::Rising
        } else {
            Readiness::Steady
        })
    }

    /// Deliver `msg` to every writable pipe and return how many accepted it.
    ///
    /// With no writable pipes the message is dropped and `0` is returned.
    /// Pipes that refuse the message or report they are now full leave the
    /// writable set.
    pub fn broadcast(&mut self, msg: Message) -> usize {
        if self.out.is_empty() {
            trace!("[DIST] no writable pipes, dropping {} bytes", msg.len());
            return 0;
        }

        let pipes = &mut self.pipes;
        let mut delivered = 0usize;

        self.out.retain(|pipe| {
            let status = pipe.send(msg.clone());
            if status.is_delivered() {
                delivered += 1;
            }
            if status.keeps_writable() {
                return true;
            }

            if let Some(member) = pipes.get_mut(&pipe.id()) {
                member.writable = false;
            }
            trace!("[DIST] {} left writable set ({:?})", pipe.id(), status);
            false
        });

        trace!(
            "[DIST] broadcast {} bytes to {} pipes ({} still writable)",
            msg.len(),
            delivered,
            self.out.len()
        );
        delivered
    }

    /// Membership state of a pipe.
    #[must_use]
    pub fn state(&self, id: PipeId) -> PipeState {
        match self.pipes.get(&id) {
            Some(member) if member.writable => PipeState::Writable,
            Some(_) => PipeState::Blocked,
            None => PipeState::Detached,
        }
    }

    /// Writable pipes in broadcast order.
    #[must_use]
    pub fn writable_ids(&self) -> SmallVec<[PipeId; 8]> {
        self.out.iter().map(Pipe::id).collect()
    }

    #[must_use]
    pub fn attached_len(&self) -> usize {
        self.pipes.len()
    }

    #[must_use]
    pub fn writable_len(&self) -> usize {
        self.out.len()
    }

    /// Whether a broadcast right now would reach at least one pipe.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        !self.out.is_empty()
    }

    /// Tear down. Pipes should already be detached by the owning socket.
    pub fn term(&mut self) {
        if !self.pipes.is_empty() {
            warn!(
                "[DIST] terminated with {} pipes still attached",
                self.pipes.len()
            );
        }
        self.out.clear();
        self.pipes.clear();
    }
}
