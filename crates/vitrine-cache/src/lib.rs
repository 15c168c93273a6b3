//! Vitrine TTL cache
//!
//! A generic key/value cache with per-entry expiration, mirrored into a
//! durable [`KeyValueStore`](vitrine_store::KeyValueStore) so small UI-state
//! values (selected filter, language, feature toggles) survive a reload.
//!
//! # Core Concepts
//!
//! - [`TtlCache`]: in-memory map with lazy expiry and a durable mirror
//! - [`CacheEntry`]: serialized value + stored-at timestamp + TTL
//!
//! An entry is valid only while `now - stored_at < ttl` (strictly less; an
//! entry is expired the instant its TTL elapses). Expired entries are
//! treated as absent and removed lazily on read or by [`TtlCache::cleanup_expired`].

mod entry;
mod error;
mod ttl;

pub use entry::CacheEntry;
pub use error::CacheError;
pub use ttl::{TtlCache, DEFAULT_TTL_MS, MIRROR_PREFIX};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
