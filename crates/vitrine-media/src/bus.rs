//! Cross-tab message bus
//!
//! Models the same-origin broadcast primitive. [`BroadcastBus`] is the
//! dedicated primitive: every tab holds a [`BusHandle`] and messages reach
//! every handle except the sender's own. [`LoopbackBus`] is the fallback for
//! runtimes without the primitive: publishing only self-delivers, so true
//! cross-tab delivery is not guaranteed there. That gap is part of the
//! contract, not fixed here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Channel capacity before slow receivers start losing messages
const CHANNEL_CAPACITY: usize = 64;

/// A relayed image entry
///
/// Transient: never persisted, consumed at most once per receiving tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMessage {
    /// Generated image key
    pub key: String,
    /// Data-URI value
    pub value: String,
    /// Instant the sender stamped the message
    pub sent_at: DateTime<Utc>,
    /// Sending handle's id; used to suppress self-delivery
    pub origin: u64,
}

/// Pub/sub port for the cross-tab channel
///
/// Publishing is best-effort: with no live subscribers, or on a runtime
/// without the primitive, the message is simply lost and no error is
/// raised. There is no acknowledgement, ordering guarantee relative to the
/// sender's own storage writes, or deduplication.
pub trait TabBus: Send + Sync {
    /// Send a message to the other tabs on this channel
    fn publish(&self, msg: ImageMessage);

    /// Open a message stream for this tab
    fn subscribe(&self) -> BusSubscription;

    /// Identity of this tab's handle, stamped on outgoing messages
    fn origin(&self) -> u64;
}

/// Receiving end of a bus subscription
pub struct BusSubscription {
    rx: broadcast::Receiver<ImageMessage>,
    /// Messages from this origin are skipped (the dedicated primitive does
    /// not self-deliver); `None` means deliver everything, which is how the
    /// loopback fallback behaves.
    skip_origin: Option<u64>,
}

impl BusSubscription {
    /// Wait for the next message
    ///
    /// Returns `None` once the channel is closed. A lagged receiver skips
    /// the messages it missed and keeps going; dropped messages are the
    /// documented best-effort behavior.
    pub async fn recv(&mut self) -> Option<ImageMessage> {
        loop {
            match self.rx.recv().await {
                Ok(msg) => {
                    if Some(msg.origin) == self.skip_origin {
                        continue;
                    }
                    return Some(msg);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    trace!(skipped, "bus receiver lagged, messages dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl std::fmt::Debug for BusSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusSubscription")
            .field("skip_origin", &self.skip_origin)
            .finish()
    }
}

/// The dedicated cross-tab broadcast primitive
///
/// One instance per named channel; each tab takes a [`BusHandle`].
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    tx: broadcast::Sender<ImageMessage>,
    next_origin: Arc<AtomicU64>,
}

impl BroadcastBus {
    /// Create a channel
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            next_origin: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Open a handle for one tab
    #[must_use]
    pub fn handle(&self) -> BusHandle {
        BusHandle {
            tx: self.tx.clone(),
            origin: self.next_origin.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One tab's connection to a [`BroadcastBus`]
#[derive(Debug, Clone)]
pub struct BusHandle {
    tx: broadcast::Sender<ImageMessage>,
    origin: u64,
}

impl TabBus for BusHandle {
    fn publish(&self, mut msg: ImageMessage) {
        msg.origin = self.origin;
        // send only fails with zero receivers; that is the no-other-tabs
        // case and degrades silently.
        let _ = self.tx.send(msg);
    }

    fn subscribe(&self) -> BusSubscription {
        BusSubscription {
            rx: self.tx.subscribe(),
            skip_origin: Some(self.origin),
        }
    }

    fn origin(&self) -> u64 {
        self.origin
    }
}

/// Fallback bus for runtimes without the broadcast primitive
///
/// Posts to the current window only: subscribers of this same instance
/// receive the message, other tabs never do.
#[derive(Debug)]
pub struct LoopbackBus {
    tx: broadcast::Sender<ImageMessage>,
}

impl LoopbackBus {
    /// Create a self-delivering bus
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

impl TabBus for LoopbackBus {
    fn publish(&self, msg: ImageMessage) {
        let _ = self.tx.send(msg);
    }

    fn subscribe(&self) -> BusSubscription {
        BusSubscription {
            rx: self.tx.subscribe(),
            skip_origin: None,
        }
    }

    fn origin(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(key: &str) -> ImageMessage {
        ImageMessage {
            key: key.to_string(),
            value: "data:image/png;base64,xyz".to_string(),
            sent_at: Utc::now(),
            origin: 0,
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_other_handles_not_sender() {
        let bus = BroadcastBus::new();
        let sender = bus.handle();
        let receiver = bus.handle();

        let mut sender_sub = sender.subscribe();
        let mut receiver_sub = receiver.subscribe();

        sender.publish(message("k1"));

        let got = tokio::time::timeout(std::time::Duration::from_millis(100), receiver_sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.key, "k1");
        assert_eq!(got.origin, sender.origin());

        // The sender's own subscription must not see the message.
        let own = tokio::time::timeout(std::time::Duration::from_millis(50), sender_sub.recv()).await;
        assert!(own.is_err());
    }

    #[tokio::test]
    async fn loopback_self_delivers_only() {
        let bus = LoopbackBus::new();
        let mut sub = bus.subscribe();
        bus.publish(message("k2"));

        let got = sub.recv().await.unwrap();
        assert_eq!(got.key, "k2");

        // A second, independent loopback instance is a different "window".
        let other = LoopbackBus::new();
        let mut other_sub = other.subscribe();
        bus.publish(message("k3"));
        let missed =
            tokio::time::timeout(std::time::Duration::from_millis(50), other_sub.recv()).await;
        assert!(missed.is_err());
    }

    #[tokio::test]
    async fn publish_without_subscribers_degrades_silently() {
        let bus = BroadcastBus::new();
        let handle = bus.handle();
        handle.publish(message("lost"));
        // No panic, no error surface.
    }

    #[tokio::test]
    async fn duplicate_publish_delivers_twice() {
        let bus = BroadcastBus::new();
        let sender = bus.handle();
        let receiver = bus.handle();
        let mut sub = receiver.subscribe();

        sender.publish(message("dup"));
        sender.publish(message("dup"));

        assert_eq!(sub.recv().await.unwrap().key, "dup");
        assert_eq!(sub.recv().await.unwrap().key, "dup");
    }
}
