//! Socket shell: one open socket bound to one pattern.
//!
//! The shell owns the pattern instance chosen from the global registry and
//! mediates both directions:
//! - application calls (`send`, `recv`, options, headers) go to the pattern;
//! - transport events (`attach_pipe`, `detach_pipe`, `pipe_readable`,
//!   `pipe_writable`) are validated against the attached pipes and forwarded.
//!
//! Errors the pattern classifies as fatal are invariant breaks in whoever
//! drives the socket. The shell logs them and panics instead of handing them
//! back as ordinary results.

use std::sync::atomic::{AtomicU32, Ordering};

use bytes::Bytes;
use hashbrown::HashMap;
use once_cell::sync::Lazy;
use scalesock_core::dist::Readiness;
use scalesock_core::error::{Result, SocketError};
use scalesock_core::message::Message;
use scalesock_core::monitor::{create_monitor, SocketEvent, SocketEventSender, SocketMonitor};
use scalesock_core::options::{OptionLevel, OptionValue, SocketOptions};
use scalesock_core::pipe::{Pipe, PipeId};
use scalesock_core::protocol::Protocol;
use scalesock_core::registry::Registry;
use scalesock_core::socket_type::{Domain, SocketType};
use tracing::{debug, error, trace};

use crate::inproc::{self, InprocPeer};

/// Process-wide pattern registry, built on first use.
static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::new();
    for entry in scalesock_protocols::builtin() {
        if let Err(e) = registry.register(entry) {
            error!("[REGISTRY] {}", e);
        }
    }
    registry
});

/// The registry every [`Socket::open`] consults.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Lifecycle of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    /// Open; calls are forwarded to the pattern.
    Active,
    /// Closed; every call returns `Terminated`.
    Terminated,
}

/// A socket: generic shell state plus one pattern instance.
///
/// ## Example
///
/// ```rust
/// use scalesock::{inproc, Domain, Socket, SocketType};
///
/// let mut socket = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
///
/// // Transport side: a subscriber connects and becomes writable.
/// let (pipe, peer) = inproc::pair(SocketType::Sub, 16);
/// socket.attach_pipe(pipe.clone()).unwrap();
/// socket.pipe_writable(pipe.id()).unwrap();
///
/// socket.send("hello").unwrap();
/// assert_eq!(peer.try_recv().unwrap().body(), &b"hello"[..]);
/// ```
pub struct Socket {
    id: u32,
    domain: Domain,
    socket_type: SocketType,
    protocol: Box<dyn Protocol>,
    pipes: HashMap<PipeId, Pipe>,
    options: SocketOptions,
    state: SocketState,
    monitor: Option<SocketEventSender>,
}

impl Socket {
    /// Open a socket with default options.
    ///
    /// # Errors
    ///
    /// `UnsupportedSocketType` if no pattern is registered for the pair.
    pub fn open(domain: Domain, socket_type: SocketType) -> Result<Self> {
        Self::open_with_options(domain, socket_type, SocketOptions::default())
    }

    /// Open a socket with explicit options.
    pub fn open_with_options(
        domain: Domain,
        socket_type: SocketType,
        options: SocketOptions,
    ) -> Result<Self> {
        static NEXT_ID: AtomicU32 = AtomicU32::new(0);

        let protocol = registry().create(domain, socket_type)?;
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        debug!("[SOCKET {}] opened {} in {}", id, socket_type, domain);

        Ok(Self {
            id,
            domain,
            socket_type,
            protocol,
            pipes: HashMap::new(),
            options,
            state: SocketState::Active,
            monitor: None,
        })
    }

    /// Send one message through the pattern.
    pub fn send(&mut self, msg: impl Into<Message>) -> Result<()> {
        self.ensure_active()?;
        let msg = msg.into();
        trace!("[SOCKET {}] send {} bytes", self.label(), msg.len());
        let result = self.protocol.send(msg);
        self.check(result)
    }

    /// Receive one message through the pattern.
    pub fn recv(&mut self) -> Result<Message> {
        self.ensure_active()?;
        let result = self.protocol.recv();
        self.check(result)
    }

    /// Set an option. `Socket` level is handled here, a matching `Protocol`
    /// level by the pattern.
    pub fn set_option(&mut self, level: OptionLevel, option: i32, value: OptionValue) -> Result<()> {
        self.ensure_active()?;
        match level {
            OptionLevel::Socket => self.options.set(option, &value),
            OptionLevel::Protocol(ty) if ty == self.socket_type => {
                self.protocol.set_option(option, &value)
            }
            OptionLevel::Protocol(_) => Err(SocketError::UnknownOption { level, option }),
        }
    }

    /// Read an option.
    pub fn get_option(&self, level: OptionLevel, option: i32) -> Result<OptionValue> {
        self.ensure_active()?;
        match level {
            OptionLevel::Socket => self.options.get(option),
            OptionLevel::Protocol(ty) if ty == self.socket_type => self.protocol.get_option(option),
            OptionLevel::Protocol(_) => Err(SocketError::UnknownOption { level, option }),
        }
    }

    /// Attach pattern header bytes to an outgoing message.
    pub fn set_header(&self, msg: &mut Message, hdr: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.protocol.set_header(msg, hdr)
    }

    /// Pattern header bytes of a message.
    pub fn get_header(&self, msg: &Message) -> Result<Bytes> {
        self.ensure_active()?;
        Ok(self.protocol.get_header(msg))
    }

    /// Transport event: a peer connected.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the peer's socket type cannot talk to this one.
    pub fn attach_pipe(&mut self, pipe: Pipe) -> Result<()> {
        self.ensure_active()?;
        let peer = pipe.peer_type();
        if !self.socket_type.is_compatible(peer) {
            return Err(SocketError::invalid_argument(format!(
                "{} peer cannot connect to a {} socket",
                peer, self.socket_type
            )));
        }

        let result = self.protocol.add(&pipe);
        self.check(result)?;

        let id = pipe.id();
        self.pipes.insert(id, pipe);
        debug!("[SOCKET {}] attached {} ({} pipes)", self.label(), id, self.pipes.len());
        self.emit(SocketEvent::PipeAttached(id));
        Ok(())
    }

    /// Transport event: a peer disconnected.
    pub fn detach_pipe(&mut self, id: PipeId) -> Result<()> {
        self.ensure_active()?;
        let Some(pipe) = self.pipes.remove(&id) else {
            return self.check(Err(SocketError::UnknownPipe(id)));
        };

        self.protocol.rm(&pipe);
        debug!("[SOCKET {}] detached {} ({} pipes)", self.label(), id, self.pipes.len());
        self.emit(SocketEvent::PipeDetached(id));
        Ok(())
    }

    /// Transport event: inbound data is waiting on `id`.
    pub fn pipe_readable(&mut self, id: PipeId) -> Result<Readiness> {
        self.ensure_active()?;
        let pipe = self.pipe(id)?;
        let result = self.protocol.pipe_in(&pipe);
        self.check(result)
    }

    /// Transport event: `id` can accept outbound data again.
    ///
    /// Emits [`SocketEvent::SendReady`] on a readiness edge.
    pub fn pipe_writable(&mut self, id: PipeId) -> Result<Readiness> {
        self.ensure_active()?;
        let pipe = self.pipe(id)?;
        let result = self.protocol.pipe_out(&pipe);
        let readiness = self.check(result)?;
        if readiness.is_rising() {
            trace!("[SOCKET {}] ready to send", self.label());
            self.emit(SocketEvent::SendReady);
        }
        Ok(readiness)
    }

    /// Create an in-process peer sized by `send_hwm`, attach it and mark it
    /// writable.
    pub fn connect_inproc(&mut self) -> Result<InprocPeer> {
        let (pipe, peer) = inproc::pair(self.socket_type.peer(), self.options.send_hwm);
        let id = pipe.id();
        self.attach_pipe(pipe)?;
        self.pipe_writable(id)?;
        Ok(peer)
    }

    /// Detach every pipe and terminate the pattern.
    ///
    /// Every later call returns `Terminated`.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_active()?;
        let pipes: Vec<Pipe> = self.pipes.drain().map(|(_, pipe)| pipe).collect();
        for pipe in pipes {
            self.protocol.rm(&pipe);
            self.emit(SocketEvent::PipeDetached(pipe.id()));
        }
        self.protocol.terminate();
        self.state = SocketState::Terminated;
        debug!("[SOCKET {}] closed", self.label());
        self.emit(SocketEvent::Closed);
        Ok(())
    }

    /// Enable monitoring for this socket.
    ///
    /// Returns a receiver for pipe lifecycle and readiness events.
    pub fn monitor(&mut self) -> SocketMonitor {
        let (sender, receiver) = create_monitor();
        self.monitor = Some(sender);
        receiver
    }

    /// Process-unique socket number.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Domain the socket was opened in.
    #[inline]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Pattern of this socket.
    #[inline]
    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    /// Lifecycle state.
    #[inline]
    pub fn state(&self) -> SocketState {
        self.state
    }

    /// Current shell-level options.
    pub fn options(&self) -> &SocketOptions {
        &self.options
    }

    /// Number of attached pipes.
    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            SocketState::Active => Ok(()),
            SocketState::Terminated => Err(SocketError::Terminated),
        }
    }

    fn pipe(&self, id: PipeId) -> Result<Pipe> {
        match self.pipes.get(&id) {
            Some(pipe) => Ok(pipe.clone()),
            None => self.check(Err(SocketError::UnknownPipe(id))),
        }
    }

    /// Pass ordinary results through; escalate fatal ones.
    fn check<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Err(e) if e.is_fatal() => {
                error!("[SOCKET {}] fatal: {}", self.label(), e);
                panic!("socket {} ({}): {}", self.label(), self.socket_type, e);
            }
            other => other,
        }
    }

    fn emit(&self, event: SocketEvent) {
        if let Some(monitor) = &self.monitor {
            let _ = monitor.send(event);
        }
    }

    fn label(&self) -> String {
        match &self.options.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}

impl std::fmt::Debug for Socket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socket")
            .field("id", &self.id)
            .field("domain", &self.domain)
            .field("socket_type", &self.socket_type)
            .field("pipes", &self.pipes.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        if self.state == SocketState::Active {
            let _ = self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalesock_core::options::sockopt;

    #[test]
    fn open_unregistered_pattern_fails() {
        let err = Socket::open(Domain::Sp, SocketType::Sub).unwrap_err();
        assert_eq!(
            err,
            SocketError::UnsupportedSocketType {
                domain: Domain::Sp,
                socket_type: SocketType::Sub
            }
        );
        assert!(Socket::open(Domain::SpRaw, SocketType::Pub).is_err());
    }

    #[test]
    fn socket_level_options_are_handled_by_shell() {
        let mut socket = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
        socket
            .set_option(OptionLevel::Socket, sockopt::SNDHWM, OptionValue::Int(8))
            .unwrap();
        assert_eq!(socket.options().send_hwm, 8);
        assert_eq!(
            socket.get_option(OptionLevel::Socket, sockopt::SNDHWM).unwrap(),
            OptionValue::Int(8)
        );
    }

    #[test]
    fn foreign_protocol_level_is_unknown() {
        let socket = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
        let level = OptionLevel::Protocol(SocketType::Sub);
        assert_eq!(
            socket.get_option(level, 1),
            Err(SocketError::UnknownOption { level, option: 1 })
        );
    }

    #[test]
    fn incompatible_peer_rejected() {
        let mut socket = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
        let (pipe, _peer) = inproc::pair(SocketType::Pull, 4);
        assert!(matches!(
            socket.attach_pipe(pipe),
            Err(SocketError::InvalidArgument(_))
        ));
        assert_eq!(socket.pipe_count(), 0);
    }

    #[test]
    fn closed_socket_rejects_everything() {
        let mut socket = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
        let _peer = socket.connect_inproc().unwrap();
        socket.close().unwrap();

        assert_eq!(socket.state(), SocketState::Terminated);
        assert_eq!(socket.pipe_count(), 0);
        assert_eq!(socket.send("late"), Err(SocketError::Terminated));
        assert_eq!(socket.close(), Err(SocketError::Terminated));
    }

    #[test]
    fn zero_send_hwm_still_holds_one_message() {
        let options = SocketOptions::new().with_send_hwm(0);
        let mut socket = Socket::open_with_options(Domain::Sp, SocketType::Pub, options).unwrap();
        assert_eq!(socket.options().send_hwm, 1);

        let peer = socket.connect_inproc().unwrap();
        socket.send("a").unwrap();
        socket.send("b").unwrap();
        assert_eq!(peer.drain().len(), socket.options().send_hwm);
    }

    #[test]
    fn close_reports_each_detached_pipe_once() {
        let mut socket = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
        let events = socket.monitor();
        let a = socket.connect_inproc().unwrap();
        let b = socket.connect_inproc().unwrap();
        socket.close().unwrap();

        let detached: Vec<PipeId> = events
            .try_iter()
            .filter_map(|e| match e {
                SocketEvent::PipeDetached(id) => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(detached.len(), 2);
        assert!(detached.contains(&a.pipe_id()));
        assert!(detached.contains(&b.pipe_id()));
    }

    #[test]
    #[should_panic(expected = "Protocol violation")]
    fn inbound_data_on_publisher_panics() {
        let mut socket = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
        let peer = socket.connect_inproc().unwrap();
        let _ = socket.pipe_readable(peer.pipe_id());
    }

    #[test]
    #[should_panic(expected = "Unknown pipe")]
    fn event_for_unknown_pipe_panics() {
        let mut socket = Socket::open(Domain::Sp, SocketType::Pub).unwrap();
        let (stranger, _peer) = inproc::pair(SocketType::Sub, 1);
        let _ = socket.pipe_writable(stranger.id());
    }
}
