//! Vitrine media layer
//!
//! Saves uploaded images as data-URI strings under generated keys in two
//! storage scopes, relays new entries to other tabs over a pub/sub bus, and
//! resolves a displayable image for any content record with a placeholder
//! fallback when the stored data is missing.
//!
//! # Core Concepts
//!
//! - [`ImageKey`]: `portfolio-image-{millis}-{suffix}` keys
//! - [`ImageStore`]: dual-scope save/lookup with broadcast on save
//! - [`TabBus`] / [`Broadcaster`]: best-effort cross-tab relay
//! - [`resolve_display_image`]: total fallback resolution (store hit, then
//!   title table, then category table, then default)
//! - [`repair_missing_images`] / [`prune_unreferenced`]: batch heuristics
//!   over the content backend
//!
//! # Consistency contract
//!
//! The relay is eventually consistent and at-most-once per tab: no
//! acknowledgement, no ordering guarantee relative to the sender's own
//! storage writes, no deduplication, and no delivery at all on runtimes
//! without a broadcast primitive (the [`LoopbackBus`] fallback only
//! self-delivers). Overlapping writes to one key are last-write-wins.

mod broadcaster;
mod bus;
mod data_uri;
mod error;
mod key;
mod placeholder;
mod repair;
mod store;

pub use broadcaster::{Broadcaster, SubscriptionGuard};
pub use bus::{BroadcastBus, BusHandle, BusSubscription, ImageMessage, LoopbackBus, TabBus};
pub use data_uri::{mime_for_extension, to_data_uri};
pub use error::MediaError;
pub use key::{is_image_key, ImageKey, ImageKeyError, KEY_PREFIX};
pub use placeholder::{placeholder_for, resolve_display_image, DEFAULT_PLACEHOLDER};
pub use repair::{prune_unreferenced, repair_missing_images, PruneReport, RepairReport};
pub use store::ImageStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
