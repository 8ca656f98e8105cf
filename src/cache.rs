//! Owner name cache.
//!
//! Resolving a uid to a user name goes through NSS and can be slow, so every
//! resolved name is kept for the lifetime of the process. Entries are never
//! evicted or replaced.

use ahash::AHashMap as HashMap;
use nix::unistd::{Uid, User};
use tracing::debug;

use crate::error::ScrapeError;

/// Resolves a numeric owner id to a display name.
pub trait IdentityResolver {
    fn resolve(&self, uid: u32) -> Result<String, ScrapeError>;
}

/// Resolver backed by the system user database.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentity;

impl IdentityResolver for SystemIdentity {
    fn resolve(&self, uid: u32) -> Result<String, ScrapeError> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => Ok(user.name),
            Ok(None) => Err(ScrapeError::UnknownOwner(uid)),
            Err(e) => Err(ScrapeError::OwnerLookup {
                uid,
                message: e.to_string(),
            }),
        }
    }
}

/// Insertion-only uid -> user name map.
#[derive(Debug, Clone, Default)]
pub struct OwnerCache {
    names: HashMap<u32, String>,
}

impl OwnerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, uid: u32) -> Option<&str> {
        self.names.get(&uid).map(String::as_str)
    }

    /// Stores a resolved name. An existing entry is kept as is.
    pub fn insert(&mut self, uid: u32, name: String) {
        self.names.entry(uid).or_insert(name);
    }

    /// Returns the cached name for `uid`, asking `resolver` only on a miss.
    /// Failed lookups are not cached and will be retried on the next call.
    pub fn resolve<R>(&mut self, uid: u32, resolver: &R) -> Result<String, ScrapeError>
    where
        R: IdentityResolver + ?Sized,
    {
        if let Some(name) = self.lookup(uid) {
            return Ok(name.to_string());
        }
        let name = resolver.resolve(uid)?;
        debug!(uid, name = %name, "resolved owner");
        self.insert(uid, name.clone());
        Ok(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
