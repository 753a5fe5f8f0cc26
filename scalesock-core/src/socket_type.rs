//! Socket domains and pattern identifiers.
//!
//! Every socket pattern is identified by a `(Domain, SocketType)` pair. The
//! numeric values follow the scalability-protocols family: the high nibble of
//! a socket type is the protocol, the low nibble the role within it.

use std::fmt;

use crate::error::SocketError;

/// Socket domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Domain {
    /// Full-featured socket (AF_SP)
    Sp = 1,

    /// Raw socket without end-to-end pattern state (AF_SP_RAW)
    SpRaw = 2,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sp => f.write_str("AF_SP"),
            Self::SpRaw => f.write_str("AF_SP_RAW"),
        }
    }
}

/// Messaging pattern of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SocketType {
    /// PAIR socket for exclusive one-to-one communication
    Pair = 16,

    /// PUB socket broadcasting to every connected subscriber
    Pub = 32,

    /// SUB socket receiving published messages
    Sub = 33,

    /// REQ socket sending requests and receiving replies
    Req = 48,

    /// REP socket answering requests
    Rep = 49,

    /// PUSH socket distributing work to pullers
    Push = 80,

    /// PULL socket collecting work from pushers
    Pull = 81,

    /// SURVEYOR socket broadcasting surveys and collecting responses
    Surveyor = 98,

    /// RESPONDENT socket answering surveys
    Respondent = 99,

    /// BUS socket for many-to-many broadcast
    Bus = 112,
}

impl SocketType {
    /// Get the socket type as a string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pair => "PAIR",
            Self::Pub => "PUB",
            Self::Sub => "SUB",
            Self::Req => "REQ",
            Self::Rep => "REP",
            Self::Push => "PUSH",
            Self::Pull => "PULL",
            Self::Surveyor => "SURVEYOR",
            Self::Respondent => "RESPONDENT",
            Self::Bus => "BUS",
        }
    }

    /// Protocol family number (socket type divided by 16).
    #[must_use]
    pub const fn protocol(&self) -> u16 {
        (*self as u16) >> 4
    }

    /// Canonical peer type for this pattern.
    #[must_use]
    pub const fn peer(&self) -> SocketType {
        match self {
            Self::Pair => Self::Pair,
            Self::Pub => Self::Sub,
            Self::Sub => Self::Pub,
            Self::Req => Self::Rep,
            Self::Rep => Self::Req,
            Self::Push => Self::Pull,
            Self::Pull => Self::Push,
            Self::Surveyor => Self::Respondent,
            Self::Respondent => Self::Surveyor,
            Self::Bus => Self::Bus,
        }
    }

    /// Check if a peer of the given type may be attached to a socket of this type.
    pub fn is_compatible(&self, peer: SocketType) -> bool {
        matches!(
            (self, peer),
            (Self::Pair, Self::Pair)
                | (Self::Pub, Self::Sub)
                | (Self::Sub, Self::Pub)
                | (Self::Req, Self::Rep)
                | (Self::Rep, Self::Req)
                | (Self::Push, Self::Pull)
                | (Self::Pull, Self::Push)
                | (Self::Surveyor, Self::Respondent)
                | (Self::Respondent, Self::Surveyor)
                | (Self::Bus, Self::Bus)
        )
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<u16> for SocketType {
    type Error = SocketError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Ok(match raw {
            16 => Self::Pair,
            32 => Self::Pub,
            33 => Self::Sub,
            48 => Self::Req,
            49 => Self::Rep,
            80 => Self::Push,
            81 => Self::Pull,
            98 => Self::Surveyor,
            99 => Self::Respondent,
            112 => Self::Bus,
            other => {
                return Err(SocketError::InvalidArgument(format!(
                    "unknown socket type {other}"
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_type_display() {
        assert_eq!(SocketType::Pub.to_string(), "PUB");
        assert_eq!(SocketType::Respondent.to_string(), "RESPONDENT");
        assert_eq!(Domain::SpRaw.to_string(), "AF_SP_RAW");
    }

    #[test]
    fn test_socket_compatibility() {
        assert!(SocketType::Pub.is_compatible(SocketType::Sub));
        assert!(SocketType::Sub.is_compatible(SocketType::Pub));
        assert!(SocketType::Push.is_compatible(SocketType::Pull));
        assert!(SocketType::Bus.is_compatible(SocketType::Bus));

        // Incompatible pairs
        assert!(!SocketType::Pub.is_compatible(SocketType::Pub));
        assert!(!SocketType::Pub.is_compatible(SocketType::Pull));
    }

    #[test]
    fn test_peer_is_compatible() {
        for ty in [SocketType::Pub, SocketType::Req, SocketType::Bus, SocketType::Surveyor] {
            assert!(ty.is_compatible(ty.peer()));
        }
    }

    #[test]
    fn test_raw_round_trip_and_protocol() {
        assert_eq!(SocketType::try_from(32).unwrap(), SocketType::Pub);
        assert_eq!(SocketType::Pub.protocol(), SocketType::Sub.protocol());
        assert!(SocketType::try_from(7).is_err());
    }
}
