//! Channel access-hash store
//!
//! The transport needs a per-channel access hash alongside the channel id
//! to address a channel. Hashes are learned once (from configuration or the
//! transport's dialog listing) and read on every forward.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use relay_routing::ChannelId;

/// Transport-level credential for addressing a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessHash(i64);

impl AccessHash {
    /// Create an access hash from its raw value
    #[inline]
    #[must_use]
    pub const fn new(hash: i64) -> Self {
        Self(hash)
    }

    /// Get the raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccessHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Thread-safe `ChannelId → AccessHash` map
///
/// # Example
///
/// ```
/// use relay_dispatch::{AccessHash, AccessHashStore};
/// use relay_routing::ChannelId;
///
/// let store = AccessHashStore::new();
/// store.set(ChannelId::new(1), AccessHash::new(-77));
///
/// assert_eq!(store.get(ChannelId::new(1)), Some(AccessHash::new(-77)));
/// assert_eq!(store.get(ChannelId::new(2)), None);
/// ```
#[derive(Debug, Default)]
pub struct AccessHashStore {
    inner: RwLock<HashMap<ChannelId, AccessHash>>,
}

impl AccessHashStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the hash for a channel
    pub fn set(&self, channel: ChannelId, hash: AccessHash) {
        self.inner.write().insert(channel, hash);
    }

    /// Get the hash for a channel
    #[inline]
    pub fn get(&self, channel: ChannelId) -> Option<AccessHash> {
        self.inner.read().get(&channel).copied()
    }

    /// Check if a channel's hash is known
    #[inline]
    pub fn contains(&self, channel: ChannelId) -> bool {
        self.inner.read().contains_key(&channel)
    }

    /// Number of known channels
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the store is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl FromIterator<(ChannelId, AccessHash)> for AccessHashStore {
    fn from_iter<I: IntoIterator<Item = (ChannelId, AccessHash)>>(iter: I) -> Self {
        Self {
            inner: RwLock::new(iter.into_iter().collect()),
        }
    }
}
