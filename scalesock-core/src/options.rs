//! Socket configuration options
//!
//! Shell-level settings live in [`SocketOptions`]. Runtime get/set calls are
//! addressed by an [`OptionLevel`]: `Socket` options are handled by the shell,
//! `Protocol` options are routed to the socket's pattern.

use std::fmt;

use bytes::Bytes;

use crate::error::{Result, SocketError};
use crate::socket_type::SocketType;

/// Socket-level option codes (`OptionLevel::Socket`).
pub mod sockopt {
    /// Outbound per-pipe high water mark, in messages.
    pub const SNDHWM: i32 = 2;
    /// Human-readable socket name used in logs.
    pub const SOCKET_NAME: i32 = 15;
}

/// Option space a get/set call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionLevel {
    /// Generic options stored by the socket shell.
    Socket,
    /// Options owned by one pattern.
    Protocol(SocketType),
}

impl fmt::Display for OptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socket => f.write_str("SOCKET"),
            Self::Protocol(ty) => write!(f, "{ty}"),
        }
    }
}

/// Value carried by a get/set option call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Int(i64),
    Bytes(Bytes),
}

impl OptionValue {
    /// Interpret as an integer.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Bytes(_) => Err(SocketError::invalid_argument("expected an integer value")),
        }
    }

    /// Interpret as raw bytes.
    pub fn as_bytes(&self) -> Result<&Bytes> {
        match self {
            Self::Bytes(b) => Ok(b),
            Self::Int(_) => Err(SocketError::invalid_argument("expected a byte value")),
        }
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Bytes(Bytes::copy_from_slice(v.as_bytes()))
    }
}

/// Socket configuration options.
///
/// # Examples
///
/// ```
/// use scalesock_core::options::SocketOptions;
///
/// let opts = SocketOptions::default()
///     .with_name("ticker")
///     .with_send_hwm(64);
/// assert_eq!(opts.send_hwm, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOptions {
    /// Socket name (SOCKET_NAME)
    ///
    /// Shown in log lines. Defaults to the socket's numeric id.
    pub name: Option<String>,

    /// High water mark for sending (SNDHWM)
    ///
    /// Messages a single outbound pipe may hold before it reports itself full.
    /// - Default: 1000 messages
    /// - Minimum: 1
    pub send_hwm: usize,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            name: None,
            send_hwm: 1000,
        }
    }
}

impl SocketOptions {
    /// Create new socket options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set socket name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set send high water mark. Zero is raised to one.
    pub fn with_send_hwm(mut self, hwm: usize) -> Self {
        self.send_hwm = hwm.max(1);
        self
    }

    /// Apply a socket-level option by code.
    ///
    /// # Errors
    ///
    /// `UnknownOption` for codes outside [`sockopt`], `InvalidArgument` for
    /// values of the wrong kind or out of range.
    pub fn set(&mut self, option: i32, value: &OptionValue) -> Result<()> {
        match option {
            sockopt::SNDHWM => self.send_hwm = positive(value)?,
            sockopt::SOCKET_NAME => {
                let raw = value.as_bytes()?;
                let name = std::str::from_utf8(raw)
                    .map_err(|_| SocketError::invalid_argument("socket name must be UTF-8"))?;
                self.name = Some(name.to_owned());
            }
            other => {
                return Err(SocketError::UnknownOption {
                    level: OptionLevel::Socket,
                    option: other,
                })
            }
        }
        Ok(())
    }

    /// Read a socket-level option by code.
    ///
    /// # Errors
    ///
    /// `UnknownOption` for codes outside [`sockopt`].
    pub fn get(&self, option: i32) -> Result<OptionValue> {
        Ok(match option {
            sockopt::SNDHWM => OptionValue::Int(self.send_hwm as i64),
            sockopt::SOCKET_NAME => {
                OptionValue::Bytes(Bytes::from(self.name.clone().unwrap_or_default()))
            }
            other => {
                return Err(SocketError::UnknownOption {
                    level: OptionLevel::Socket,
                    option: other,
                })
            }
        })
    }
}

fn positive(value: &OptionValue) -> Result<usize> {
    match usize::try_from(value.as_int()?) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(SocketError::invalid_argument("high water mark must be positive")),
    }
}
