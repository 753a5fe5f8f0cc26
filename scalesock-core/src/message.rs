//! Message handle passed between the shell, patterns and pipes.
//!
//! A message is a body plus an optional pattern header (`sphdr`). Both are
//! `Bytes`, so the copy handed to each pipe during fan-out is a refcount bump.

use bytes::Bytes;

/// A single message with an optional pattern-specific header.
///
/// # Examples
///
/// ```
/// use scalesock_core::message::Message;
///
/// let msg = Message::from("hello");
/// assert_eq!(msg.body(), &b"hello"[..]);
/// assert!(msg.header().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    sphdr: Bytes,
    body: Bytes,
}

impl Message {
    /// Create a message with an empty header.
    #[must_use]
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            sphdr: Bytes::new(),
            body: body.into(),
        }
    }

    /// Create a message from a body copied out of a slice.
    #[must_use]
    pub fn copy_from_slice(body: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(body))
    }

    /// Pattern header bytes.
    #[must_use]
    pub fn header(&self) -> &Bytes {
        &self.sphdr
    }

    /// Replace the pattern header.
    pub fn set_header(&mut self, hdr: impl Into<Bytes>) {
        self.sphdr = hdr.into();
    }

    /// Application payload.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Total size on the wire (header + body).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sphdr.len() + self.body.len()
    }

    /// Check if both header and body are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the message and return `(header, body)`.
    #[must_use]
    pub fn into_parts(self) -> (Bytes, Bytes) {
        (self.sphdr, self.body)
    }
}

impl From<Bytes> for Message {
    fn from(body: Bytes) -> Self {
        Self::new(body)
    }
}

impl From<Vec<u8>> for Message {
    fn from(body: Vec<u8>) -> Self {
        Self::new(body)
    }
}

impl From<&'static str> for Message {
    fn from(body: &'static str) -> Self {
        Self::new(Bytes::from_static(body.as_bytes()))
    }
}

impl From<&'static [u8]> for Message {
    fn from(body: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_body() {
        let msg = Message::copy_from_slice(b"payload");
        let copy = msg.clone();
        assert_eq!(msg.body().as_ptr(), copy.body().as_ptr());
    }

    #[test]
    fn header_counts_towards_len() {
        let mut msg = Message::from("abc");
        assert_eq!(msg.len(), 3);
        msg.set_header(Bytes::from_static(b"\x80\x00\x00\x01"));
        assert_eq!(msg.len(), 7);

        let (hdr, body) = msg.into_parts();
        assert_eq!(hdr.len(), 4);
        assert_eq!(body, &b"abc"[..]);
    }
}
