//! Cross-tab broadcaster
//!
//! Composes a bus handle with the receiving tab's two storage scopes: every
//! delivered message is written into both scopes (keeping tabs eventually
//! consistent, best-effort) before the subscriber's callback runs.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};

use vitrine_store::{Clock, KeyValueStore, StoreScope};

use crate::bus::{ImageMessage, TabBus};

/// Relays saved image entries between tabs
///
/// `publish` stamps and sends; `subscribe` spawns a listener that mirrors
/// incoming pairs into this tab's stores and then invokes the callback.
/// Duplicate deliveries repeat the storage write idempotently and fire the
/// callback again; there is no deduplication.
pub struct Broadcaster {
    bus: Arc<dyn TabBus>,
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl Broadcaster {
    /// Create a broadcaster for one tab
    #[must_use]
    pub fn new(
        bus: Arc<dyn TabBus>,
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bus,
            durable,
            session,
            clock,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Relay a newly saved key/value pair to the other tabs
    ///
    /// Best-effort: with no dedicated primitive or no other tab listening,
    /// the message is lost silently.
    pub fn publish(&self, key: &str, value: &str) {
        self.bus.publish(ImageMessage {
            key: key.to_string(),
            value: value.to_string(),
            sent_at: self.clock.now(),
            origin: self.bus.origin(),
        });
    }

    /// Register a listener for relayed entries
    ///
    /// On each delivery the pair is written into this tab's durable and
    /// session stores (write failures are logged and delivery continues),
    /// then `callback(key, value)` runs. The returned guard stops this
    /// listener when dropped or via [`SubscriptionGuard::unsubscribe`].
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionGuard
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        let mut subscription = self.bus.subscribe();
        let durable = Arc::clone(&self.durable);
        let session = Arc::clone(&self.session);

        let handle = tokio::spawn(async move {
            while let Some(msg) = subscription.recv().await {
                debug!(key = %msg.key, origin = msg.origin, "image entry relayed in");
                for (scope, store) in [
                    (StoreScope::Durable, &durable),
                    (StoreScope::Session, &session),
                ] {
                    if let Err(err) = store.set(&msg.key, &msg.value) {
                        warn!(key = %msg.key, %scope, %err, "relayed entry not stored");
                    }
                }
                callback(&msg.key, &msg.value);
            }
        });

        let abort = handle.abort_handle();
        let mut listeners = self.listeners.lock();
        // Guards abort tasks without touching this vec; drop their handles here.
        listeners.retain(|h| !h.is_finished());
        listeners.push(handle);
        SubscriptionGuard { abort }
    }

    /// Stop every listener registered through this broadcaster
    pub fn unsubscribe_all(&self) {
        for handle in self.listeners.lock().drain(..) {
            handle.abort();
        }
    }
}

impl Drop for Broadcaster {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("origin", &self.bus.origin())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

/// Stops one listener when dropped
#[derive(Debug)]
pub struct SubscriptionGuard {
    abort: AbortHandle,
}

impl SubscriptionGuard {
    /// Stop the listener now
    pub fn unsubscribe(self) {
        self.abort.abort();
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BroadcastBus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vitrine_store::{ManualClock, MemoryStore};

    fn tab(bus: &BroadcastBus) -> (Broadcaster, Arc<MemoryStore>, Arc<MemoryStore>) {
        let durable = Arc::new(MemoryStore::new(StoreScope::Durable));
        let session = Arc::new(MemoryStore::new(StoreScope::Session));
        let clock = Arc::new(ManualClock::at_millis(1_700_000_000_000));
        let broadcaster = Broadcaster::new(
            Arc::new(bus.handle()),
            durable.clone(),
            session.clone(),
            clock,
        );
        (broadcaster, durable, session)
    }

    async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn delivery_writes_both_scopes_then_calls_back() {
        let bus = BroadcastBus::new();
        let (sender, _, _) = tab(&bus);
        let (receiver, durable, session) = tab(&bus);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_callback = seen.clone();
        let _guard = receiver.subscribe(move |key, value| {
            assert_eq!(key, "portfolio-image-1-abc123");
            assert!(value.starts_with("data:image/png"));
            seen_in_callback.fetch_add(1, Ordering::SeqCst);
        });

        sender.publish("portfolio-image-1-abc123", "data:image/png;base64,xyz");
        settle().await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(
            durable.get("portfolio-image-1-abc123"),
            Some("data:image/png;base64,xyz".to_string())
        );
        assert_eq!(
            session.get("portfolio-image-1-abc123"),
            Some("data:image/png;base64,xyz".to_string())
        );
    }

    #[tokio::test]
    async fn duplicate_publish_fires_callback_twice() {
        let bus = BroadcastBus::new();
        let (sender, _, _) = tab(&bus);
        let (receiver, durable, _) = tab(&bus);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_callback = seen.clone();
        let _guard = receiver.subscribe(move |_, _| {
            seen_in_callback.fetch_add(1, Ordering::SeqCst);
        });

        sender.publish("k", "v");
        sender.publish("k", "v");
        settle().await;

        // No deduplication; the storage write repeats idempotently.
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(durable.get("k"), Some("v".to_string()));
    }

    #[tokio::test]
    async fn unsubscribed_listener_stops_receiving() {
        let bus = BroadcastBus::new();
        let (sender, _, _) = tab(&bus);
        let (receiver, durable, _) = tab(&bus);

        let guard = receiver.subscribe(|_, _| {});
        guard.unsubscribe();
        settle().await;

        sender.publish("k", "v");
        settle().await;
        assert_eq!(durable.get("k"), None);
    }

    #[tokio::test]
    async fn unsubscribe_all_stops_every_listener() {
        let bus = BroadcastBus::new();
        let (sender, _, _) = tab(&bus);
        let (receiver, durable, _) = tab(&bus);

        let _a = receiver.subscribe(|_, _| {});
        let _b = receiver.subscribe(|_, _| {});
        receiver.unsubscribe_all();
        settle().await;

        sender.publish("k", "v");
        settle().await;
        assert_eq!(durable.get("k"), None);
    }

    #[tokio::test]
    async fn subscribe_sweeps_handles_of_stopped_listeners() {
        let bus = BroadcastBus::new();
        let (receiver, _, _) = tab(&bus);

        for _ in 0..3 {
            let guard = receiver.subscribe(|_, _| {});
            guard.unsubscribe();
        }
        settle().await;

        let _live = receiver.subscribe(|_, _| {});
        assert_eq!(receiver.listeners.lock().len(), 1);
    }

    #[tokio::test]
    async fn quota_failure_on_relay_does_not_stop_callback() {
        let bus = BroadcastBus::new();
        let (sender, _, _) = tab(&bus);

        let durable = Arc::new(MemoryStore::with_quota(StoreScope::Durable, 4));
        let session = Arc::new(MemoryStore::new(StoreScope::Session));
        let clock = Arc::new(ManualClock::at_millis(0));
        let receiver = Broadcaster::new(
            Arc::new(bus.handle()),
            durable.clone(),
            session.clone(),
            clock,
        );

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_callback = seen.clone();
        let _guard = receiver.subscribe(move |_, _| {
            seen_in_callback.fetch_add(1, Ordering::SeqCst);
        });

        sender.publish("key-too-big", "a-value-over-the-durable-quota");
        settle().await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(durable.get("key-too-big"), None);
        assert!(session.contains("key-too-big"));
    }
}
