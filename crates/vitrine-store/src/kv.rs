//! Key-value store port
//!
//! Models the browser storage areas: synchronous string key/value access
//! with a finite capacity that can fail on overflow.

use std::fmt::{self, Display, Formatter};

use crate::error::StoreError;

/// Which storage area a store instance stands in for
///
/// The two areas share an interface but differ in lifetime: the durable
/// area outlives the session, the session area is scoped to one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreScope {
    /// Persists across sessions until explicitly cleared
    Durable,
    /// Scoped to the lifetime of a single tab
    Session,
}

impl StoreScope {
    /// Label used in log output
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Session => "session",
        }
    }
}

impl Display for StoreScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous string key/value store
///
/// The contract mirrors browser storage: reads never fail, writes may fail
/// on overflow, and there is no transaction boundary between operations.
/// Concurrent writers to the same key resolve as last-write-wins.
pub trait KeyValueStore: Send + Sync {
    /// Look up a value by key
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value under a key, replacing any existing value
    ///
    /// # Errors
    /// Returns [`StoreError::QuotaExceeded`] if the write would exceed the
    /// store's capacity.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key; removing an absent key is a no-op
    fn remove(&self, key: &str);

    /// Snapshot of all keys currently present
    fn keys(&self) -> Vec<String>;

    /// Remove every entry
    fn clear(&self);

    /// Number of entries currently present
    fn len(&self) -> usize;

    /// Whether the store holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a key is present
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
