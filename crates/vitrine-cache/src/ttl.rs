//! TTL cache over an in-memory map with a durable mirror

use std::future::Future;
use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use vitrine_store::{Clock, KeyValueStore};

use crate::entry::CacheEntry;
use crate::error::CacheError;

/// Default time-to-live in milliseconds: five minutes
pub const DEFAULT_TTL_MS: i64 = 5 * 60 * 1000;

/// Prefix under which entries are mirrored into the durable store
///
/// Namespacing is conventional only; nothing stops other components from
/// writing under this prefix.
pub const MIRROR_PREFIX: &str = "vitrine-cache:";

/// Key/value cache with per-entry expiration and a durable mirror
///
/// Reads consult the in-memory map first and fall back to the mirror,
/// restoring unexpired records into memory. Expired entries are treated as
/// absent and removed lazily on read or by [`TtlCache::cleanup_expired`].
///
/// Mirror writes are best-effort: a quota failure on the durable store is
/// logged and the entry stays memory-only.
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    mirror: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl TtlCache {
    /// Create a cache with the default five-minute TTL
    ///
    /// Sweeps expired mirror records at construction.
    #[must_use]
    pub fn new(mirror: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_default_ttl(mirror, clock, Duration::milliseconds(DEFAULT_TTL_MS))
    }

    /// Create a cache with a custom default TTL
    #[must_use]
    pub fn with_default_ttl(
        mirror: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        default_ttl: Duration,
    ) -> Self {
        let cache = Self {
            entries: DashMap::new(),
            mirror,
            clock,
            default_ttl,
        };
        let swept = cache.cleanup_expired();
        if swept > 0 {
            debug!(swept, "expired cache records removed at startup");
        }
        cache
    }

    fn mirror_key(&self, key: &str) -> String {
        format!("{MIRROR_PREFIX}{key}")
    }

    /// Store a value with the given TTL (default TTL when `None`)
    ///
    /// # Errors
    /// Returns [`CacheError::Serialization`] if the value cannot be
    /// serialized. Mirror-write failures are logged, not returned: the entry
    /// then lives in memory only.
    pub fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let value = serde_json::to_value(value)?;
        let entry = CacheEntry::new(value, self.clock.now(), ttl);

        match serde_json::to_string(&entry) {
            Ok(record) => {
                if let Err(err) = self.mirror.set(&self.mirror_key(key), &record) {
                    warn!(key, %err, "cache entry not mirrored to durable storage");
                }
            }
            Err(err) => warn!(key, %err, "cache entry not mirrored to durable storage"),
        }

        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    /// Look up a value, treating expired entries as absent
    ///
    /// A memory miss falls back to the durable mirror; unexpired mirror
    /// records are restored into memory, expired ones deleted.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = self.clock.now();

        let hit = self
            .entries
            .get(key)
            .map(|e| (e.is_expired(now), e.value.clone()));
        match hit {
            Some((false, value)) => {
                return match serde_json::from_value(value) {
                    Ok(v) => Some(v),
                    Err(err) => {
                        warn!(key, %err, "cached value has unexpected shape");
                        None
                    }
                };
            }
            Some((true, _)) => {
                self.entries.remove(key);
                self.mirror.remove(&self.mirror_key(key));
                return None;
            }
            None => {}
        }

        let mirror_key = self.mirror_key(key);
        let raw = self.mirror.get(&mirror_key)?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(key, %err, "dropping unreadable mirror record");
                self.mirror.remove(&mirror_key);
                return None;
            }
        };
        if entry.is_expired(now) {
            self.mirror.remove(&mirror_key);
            return None;
        }
        let value = match serde_json::from_value(entry.value.clone()) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(key, %err, "mirrored value has unexpected shape");
                None
            }
        };
        self.entries.insert(key.to_string(), entry);
        value
    }

    /// Remove an entry from memory and the mirror
    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
        self.mirror.remove(&self.mirror_key(key));
    }

    /// Remove every entry, including mirror records under [`MIRROR_PREFIX`]
    ///
    /// Only prefixed mirror records are touched; the durable store is shared
    /// with other components.
    pub fn clear(&self) {
        self.entries.clear();
        for key in self.mirror.keys() {
            if key.starts_with(MIRROR_PREFIX) {
                self.mirror.remove(&key);
            }
        }
    }

    /// Keys of all currently valid entries (memory and mirror)
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| !e.value().is_expired(now))
            .map(|e| e.key().clone())
            .collect();
        for mirror_key in self.mirror.keys() {
            let Some(key) = mirror_key.strip_prefix(MIRROR_PREFIX) else {
                continue;
            };
            if self.entries.contains_key(key) {
                continue;
            }
            let valid = self
                .mirror
                .get(&mirror_key)
                .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
                .is_some_and(|entry| !entry.is_expired(now));
            if valid {
                keys.push(key.to_string());
            }
        }
        keys
    }

    /// Number of currently valid entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Whether no valid entry exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a valid (unexpired) entry exists for the key
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            return !entry.is_expired(now);
        }
        self.mirror
            .get(&self.mirror_key(key))
            .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Remove every expired entry from memory and the mirror
    ///
    /// Returns the number of entries removed. Idempotent: a second call with
    /// no intervening `set` removes nothing.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.value().is_expired(now))
            .map(|e| e.key().clone())
            .collect();
        for key in expired {
            self.entries.remove(&key);
            self.mirror.remove(&self.mirror_key(&key));
            removed += 1;
        }

        // Mirror-only records (from a previous session, or left behind after
        // a memory-only run).
        for mirror_key in self.mirror.keys() {
            let Some(key) = mirror_key.strip_prefix(MIRROR_PREFIX) else {
                continue;
            };
            if self.entries.contains_key(key) {
                continue;
            }
            let valid = self
                .mirror
                .get(&mirror_key)
                .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
                .is_some_and(|entry| !entry.is_expired(now));
            if !valid {
                self.mirror.remove(&mirror_key);
                removed += 1;
            }
        }

        removed
    }

    /// Return the cached value or fetch, store, and return it
    ///
    /// A valid cached value short-circuits the fetcher. There is no
    /// in-flight de-duplication: concurrent calls for the same missing key
    /// each invoke the fetcher independently (a cache stampede is possible).
    ///
    /// # Errors
    /// Propagates the fetcher's error. A failure to cache the fetched value
    /// is logged and the value is still returned.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key) {
            return Ok(cached);
        }

        let value = fetch().await?;
        if let Err(err) = self.set(key, &value, ttl) {
            warn!(key, %err, "fetched value could not be cached");
        }
        Ok(value)
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.len())
            .field("default_ttl_ms", &self.default_ttl.num_milliseconds())
            .finish()
    }
}
