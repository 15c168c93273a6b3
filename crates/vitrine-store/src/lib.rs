//! Vitrine storage ports
//!
//! Key-value storage abstraction for the browser-profile storage areas,
//! plus the clock port the cache and media layers use for deterministic
//! time handling.
//!
//! # Core Concepts
//!
//! - [`KeyValueStore`]: trait for a synchronous string key/value store with
//!   finite capacity (the browser storage contract)
//! - [`MemoryStore`]: in-memory implementation with an optional byte quota
//! - [`StoreScope`]: labels the two storage areas (durable vs. session)
//! - [`Clock`]: time source with system and manual implementations
//!
//! # Shared-state contract
//!
//! Stores are shared mutable state: any component may read or write any key,
//! there is no transaction boundary, and two writers to the same key resolve
//! as last-write-wins with no detection. Namespacing is conventional string
//! prefixes only. Implementations must be safe to share across threads, but
//! they make no cross-key consistency promise.

mod clock;
mod error;
mod kv;
mod memory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StoreError;
pub use kv::{KeyValueStore, StoreScope};
pub use memory::MemoryStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
