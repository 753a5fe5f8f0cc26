//! Socket-type registry: `(Domain, SocketType)` → pattern constructor.
//!
//! Built once before the first socket is opened and read-only afterwards, so
//! lookups need no locking.

use hashbrown::HashMap;
use tracing::debug;

use crate::error::{Result, SocketError};
use crate::protocol::Protocol;
use crate::socket_type::{Domain, SocketType};

/// Pattern constructor.
pub type Constructor = fn() -> Box<dyn Protocol>;

/// One registered pattern.
#[derive(Debug, Clone, Copy)]
pub struct SocketTypeEntry {
    pub domain: Domain,
    pub socket_type: SocketType,
    pub create: Constructor,
}

/// Lookup table from pattern identifier to constructor.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<(Domain, SocketType), SocketTypeEntry>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of entries.
    ///
    /// # Errors
    ///
    /// `AlreadyRegistered` if two entries share a domain and type.
    pub fn with_entries(entries: impl IntoIterator<Item = SocketTypeEntry>) -> Result<Self> {
        let mut registry = Self::new();
        for entry in entries {
            registry.register(entry)?;
        }
        Ok(registry)
    }

    /// Add one pattern.
    pub fn register(&mut self, entry: SocketTypeEntry) -> Result<()> {
        let key = (entry.domain, entry.socket_type);
        if self.entries.contains_key(&key) {
            return Err(SocketError::AlreadyRegistered {
                domain: entry.domain,
                socket_type: entry.socket_type,
            });
        }
        debug!("[REGISTRY] {} registered in {}", entry.socket_type, entry.domain);
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Find the entry for a pattern.
    pub fn lookup(&self, domain: Domain, socket_type: SocketType) -> Result<&SocketTypeEntry> {
        self.entries
            .get(&(domain, socket_type))
            .ok_or(SocketError::UnsupportedSocketType {
                domain,
                socket_type,
            })
    }

    /// Construct a fresh pattern instance.
    pub fn create(&self, domain: Domain, socket_type: SocketType) -> Result<Box<dyn Protocol>> {
        Ok((self.lookup(domain, socket_type)?.create)())
    }

    /// Every registered entry, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &SocketTypeEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
