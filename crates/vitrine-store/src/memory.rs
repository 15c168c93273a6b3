//! In-memory key-value store
//!
//! Stand-in for both browser storage areas. An optional byte quota
//! reproduces the finite-capacity behavior: writes that would overflow
//! fail with [`StoreError::QuotaExceeded`].

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::kv::{KeyValueStore, StoreScope};

/// In-memory [`KeyValueStore`] with an optional byte quota
///
/// Usage is accounted as the sum of key and value lengths, which is close
/// enough to the UTF-16-ish accounting real storage areas do for quota
/// tests to be meaningful.
pub struct MemoryStore {
    scope: StoreScope,
    quota_bytes: Option<usize>,
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an unbounded store for the given scope
    #[must_use]
    pub fn new(scope: StoreScope) -> Self {
        Self {
            scope,
            quota_bytes: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store that fails writes beyond `quota_bytes` of usage
    #[must_use]
    pub fn with_quota(scope: StoreScope, quota_bytes: usize) -> Self {
        Self {
            scope,
            quota_bytes: Some(quota_bytes),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The scope this store stands in for
    #[inline]
    #[must_use]
    pub fn scope(&self) -> StoreScope {
        self.scope
    }

    /// Current usage in accounted bytes
    #[must_use]
    pub fn usage_bytes(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        if let Some(limit) = self.quota_bytes {
            let current: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            let existing = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let requested = current - existing + key.len() + value.len();
            if requested > limit {
                debug!(
                    scope = %self.scope,
                    key,
                    requested,
                    limit,
                    "rejecting write over quota"
                );
                return Err(StoreError::QuotaExceeded { requested, limit });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("scope", &self.scope)
            .field("quota_bytes", &self.quota_bytes)
            .field("len", &self.len())
            .finish()
    }
}
