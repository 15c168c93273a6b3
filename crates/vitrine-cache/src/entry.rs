//! Cache entry model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A cached value with its creation timestamp and time-to-live
///
/// The value is held as [`serde_json::Value`] so one cache can hold entries
/// of mixed types; typed access happens at the [`TtlCache`](crate::TtlCache)
/// surface. This is also the record shape mirrored into durable storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Serialized value
    pub value: serde_json::Value,
    /// Instant the entry was stored
    pub stored_at: DateTime<Utc>,
    /// Time-to-live in milliseconds
    pub ttl_ms: i64,
}

impl CacheEntry {
    /// Create an entry stamped at `stored_at`
    #[must_use]
    pub fn new(value: serde_json::Value, stored_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            stored_at,
            ttl_ms: ttl.num_milliseconds(),
        }
    }

    /// Whether the entry has expired as of `now`
    ///
    /// Valid strictly while `now - stored_at < ttl`; at exactly `ttl`
    /// elapsed the entry is expired.
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.stored_at).num_milliseconds() >= self.ttl_ms
    }
}
