//! PUB pattern: one-way fan-out to every writable subscriber.
//!
//! - Every connecting peer is accepted.
//! - `send` broadcasts through one [`Distributor`]; nothing is queued for
//!   peers that are not writable yet, and delivering to nobody is success.
//! - Publishers never receive: `recv` is not supported and inbound data on a
//!   pipe is a protocol violation.
//! - PUB has no options and no header; only an empty header is accepted.
//!
//! Subscription filtering happens on the receiving side.

use bytes::Bytes;
use scalesock_core::dist::{DistToken, Distributor, Readiness};
use scalesock_core::error::{Result, SocketError};
use scalesock_core::message::Message;
use scalesock_core::pipe::{Pipe, PipeSlots};
use scalesock_core::protocol::Protocol;
use scalesock_core::registry::SocketTypeEntry;
use scalesock_core::socket_type::{Domain, SocketType};
use tracing::{debug, error, trace};

/// Per-pipe state.
#[derive(Debug)]
struct PubPipeData {
    item: DistToken,
}

/// PUB socket pattern.
#[derive(Debug, Default)]
pub struct Publisher {
    outpipes: Distributor,
    pipes: PipeSlots<PubPipeData>,
}

impl Publisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry constructor.
    pub fn create() -> Box<dyn Protocol> {
        Box::new(Self::new())
    }

    /// Registry entry for `(AF_SP, PUB)`.
    #[must_use]
    pub const fn entry() -> SocketTypeEntry {
        SocketTypeEntry {
            domain: Domain::Sp,
            socket_type: SocketType::Pub,
            create: Self::create,
        }
    }

    /// Outbound pipe set, for inspection.
    #[must_use]
    pub fn distributor(&self) -> &Distributor {
        &self.outpipes
    }
}

impl Protocol for Publisher {
    fn socket_type(&self) -> SocketType {
        SocketType::Pub
    }

    fn add(&mut self, pipe: &Pipe) -> Result<()> {
        self.pipes.reserve(pipe)?;
        let item = self.outpipes.attach(pipe)?;
        self.pipes.set(pipe, PubPipeData { item })?;
        debug!("[PUB] subscriber {} attached", pipe.id());
        Ok(())
    }

    fn rm(&mut self, pipe: &Pipe) {
        match self.pipes.take(pipe) {
            Ok(data) => {
                self.outpipes.detach(data.item);
                debug!("[PUB] subscriber {} detached", pipe.id());
            }
            Err(e) => error!("[PUB] detach of unattached pipe: {}", e),
        }
    }

    fn pipe_in(&mut self, pipe: &Pipe) -> Result<Readiness> {
        Err(SocketError::protocol_violation(
            SocketType::Pub,
            format!("inbound data on {}; subscribers never send", pipe.id()),
        ))
    }

    fn pipe_out(&mut self, pipe: &Pipe) -> Result<Readiness> {
        let data = self.pipes.get(pipe)?;
        self.outpipes.mark_writable(&data.item)
    }

    fn send(&mut self, msg: Message) -> Result<()> {
        let delivered = self.outpipes.broadcast(msg);
        trace!("[PUB] published to {} subscribers", delivered);
        Ok(())
    }

    fn recv(&mut self) -> Result<Message> {
        Err(SocketError::not_supported(SocketType::Pub, "recv"))
    }

    fn set_header(&self, msg: &mut Message, hdr: &[u8]) -> Result<()> {
        if !hdr.is_empty() {
            return Err(SocketError::invalid_argument(format!(
                "PUB messages carry no header, got {} bytes",
                hdr.len()
            )));
        }
        msg.set_header(Bytes::new());
        Ok(())
    }

    fn get_header(&self, _msg: &Message) -> Bytes {
        Bytes::new()
    }

    fn terminate(&mut self) {
        for (id, data) in self.pipes.drain() {
            debug!("[PUB] dropping {} on terminate", id);
            self.outpipes.detach(data.item);
        }
        self.outpipes.term();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use scalesock_core::dist::PipeState;
    use scalesock_core::options::{OptionLevel, OptionValue};
    use scalesock_core::pipe::{PipeBackend, PipeSend};
    use std::sync::Arc;

    #[derive(Default)]
    struct Subscriber {
        received: Mutex<Vec<Bytes>>,
    }

    impl PipeBackend for Subscriber {
        fn send(&self, msg: Message) -> PipeSend {
            self.received.lock().push(msg.body().clone());
            PipeSend::Ok
        }

        fn peer_type(&self) -> SocketType {
            SocketType::Sub
        }
    }

    fn subscriber() -> (Pipe, Arc<Subscriber>) {
        let sub = Arc::new(Subscriber::default());
        (Pipe::new(sub.clone()), sub)
    }

    #[test]
    fn end_to_end_fanout() {
        let mut pubs = Publisher::new();
        let (a, ra) = subscriber();
        let (b, rb) = subscriber();
        let (c, rc) = subscriber();
        for p in [&a, &b, &c] {
            pubs.add(p).unwrap();
        }

        assert_eq!(pubs.pipe_out(&a).unwrap(), Readiness::Rising);
        assert_eq!(pubs.pipe_out(&c).unwrap(), Readiness::Steady);

        pubs.send(Message::from("hello")).unwrap();
        pubs.rm(&c);
        pubs.send(Message::from("world")).unwrap();

        assert_eq!(*ra.received.lock(), vec![Bytes::from("hello"), Bytes::from("world")]);
        assert!(rb.received.lock().is_empty());
        assert_eq!(*rc.received.lock(), vec![Bytes::from("hello")]);
        assert_eq!(pubs.distributor().state(c.id()), PipeState::Detached);
    }

    #[test]
    fn send_without_subscribers_succeeds() {
        let mut pubs = Publisher::new();
        assert_eq!(pubs.send(Message::from("void")), Ok(()));
    }

    #[test]
    fn recv_is_not_supported() {
        let mut pubs = Publisher::new();
        let expected = SocketError::not_supported(SocketType::Pub, "recv");
        assert_eq!(pubs.recv(), Err(expected.clone()));

        let (a, _) = subscriber();
        pubs.add(&a).unwrap();
        pubs.pipe_out(&a).unwrap();
        pubs.send(Message::from("x")).unwrap();
        assert_eq!(pubs.recv(), Err(expected));
    }

    #[test]
    fn inbound_data_is_fatal() {
        let mut pubs = Publisher::new();
        let (a, _) = subscriber();
        pubs.add(&a).unwrap();

        let err = pubs.pipe_in(&a).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn header_is_always_empty() {
        let pubs = Publisher::new();
        let mut msg = Message::from("payload");

        assert!(matches!(
            pubs.set_header(&mut msg, b"\x00\x01"),
            Err(SocketError::InvalidArgument(_))
        ));
        assert_eq!(pubs.set_header(&mut msg, b""), Ok(()));
        assert!(pubs.get_header(&msg).is_empty());

        msg.set_header(Bytes::from_static(b"routing"));
        assert_eq!(pubs.get_header(&msg).len(), 0);
    }

    #[test]
    fn every_option_is_unknown() {
        let mut pubs = Publisher::new();
        for option in [0, 1, 2, 100] {
            let expected = SocketError::UnknownOption {
                level: OptionLevel::Protocol(SocketType::Pub),
                option,
            };
            assert_eq!(pubs.set_option(option, &OptionValue::Int(1)), Err(expected.clone()));
            assert_eq!(pubs.get_option(option), Err(expected));
        }
    }

    #[test]
    fn unknown_pipe_events_are_fatal() {
        let mut pubs = Publisher::new();
        let (stranger, _) = subscriber();
        let err = pubs.pipe_out(&stranger).unwrap_err();
        assert_eq!(err, SocketError::UnknownPipe(stranger.id()));
        assert!(err.is_fatal());

        let (a, _) = subscriber();
        pubs.add(&a).unwrap();
        assert!(pubs.add(&a).unwrap_err().is_fatal());
    }

    #[test]
    fn terminate_releases_all_pipes() {
        let mut pubs = Publisher::new();
        let (a, _) = subscriber();
        pubs.add(&a).unwrap();
        pubs.pipe_out(&a).unwrap();

        pubs.terminate();
        assert_eq!(pubs.distributor().attached_len(), 0);
    }
}
