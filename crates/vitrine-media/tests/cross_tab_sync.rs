//! End-to-end relay: an image saved in one tab becomes readable in another.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vitrine_media::{BroadcastBus, Broadcaster, ImageStore, LoopbackBus};
use vitrine_store::{Clock, KeyValueStore, ManualClock, MemoryStore, StoreScope};

struct Tab {
    images: ImageStore,
    broadcaster: Arc<Broadcaster>,
    durable: Arc<MemoryStore>,
}

fn open_tab(bus: &BroadcastBus, clock: Arc<dyn Clock>) -> Tab {
    let durable = Arc::new(MemoryStore::new(StoreScope::Durable));
    let session = Arc::new(MemoryStore::new(StoreScope::Session));
    let broadcaster = Arc::new(Broadcaster::new(
        Arc::new(bus.handle()),
        durable.clone(),
        session.clone(),
        clock.clone(),
    ));
    let images = ImageStore::new(durable.clone(), session, clock)
        .with_broadcaster(broadcaster.clone());
    Tab {
        images,
        broadcaster,
        durable,
    }
}

async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
}

#[tokio::test]
async fn saved_image_propagates_to_other_tab() {
    let bus = BroadcastBus::new();
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_millis(1_700_000_000_000));

    let editor = open_tab(&bus, clock.clone());
    let viewer = open_tab(&bus, clock);

    let relayed = Arc::new(AtomicUsize::new(0));
    let relayed_in_callback = relayed.clone();
    let _guard = viewer.broadcaster.subscribe(move |_, _| {
        relayed_in_callback.fetch_add(1, Ordering::SeqCst);
    });

    let key = editor
        .images
        .save_bytes(b"uploaded-image", "image/png")
        .unwrap()
        .to_string();
    settle().await;

    // The sender sees its own write immediately.
    assert!(editor.images.get(&key).is_some());
    // The other tab received the relay and can now serve the key locally.
    assert_eq!(relayed.load(Ordering::SeqCst), 1);
    assert_eq!(viewer.images.get(&key), editor.images.get(&key));
    assert!(viewer.durable.contains(&key));
}

#[tokio::test]
async fn tab_without_subscription_stays_stale() {
    let bus = BroadcastBus::new();
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_millis(0));

    let editor = open_tab(&bus, clock.clone());
    let idle = open_tab(&bus, clock);

    let key = editor.images.save_bytes(b"x", "image/webp").unwrap().to_string();
    settle().await;

    // No listener registered: eventual consistency is opt-in, best-effort.
    assert_eq!(idle.images.get(&key), None);
}

#[tokio::test]
async fn loopback_fallback_never_reaches_other_tabs() {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_millis(0));

    // Two "tabs" on a runtime without the broadcast primitive: each gets its
    // own loopback bus, so publishes only self-deliver.
    let durable_a = Arc::new(MemoryStore::new(StoreScope::Durable));
    let session_a = Arc::new(MemoryStore::new(StoreScope::Session));
    let broadcaster_a = Arc::new(Broadcaster::new(
        Arc::new(LoopbackBus::new()),
        durable_a.clone(),
        session_a.clone(),
        clock.clone(),
    ));
    let images_a = ImageStore::new(durable_a, session_a, clock.clone())
        .with_broadcaster(broadcaster_a.clone());

    let durable_b = Arc::new(MemoryStore::new(StoreScope::Durable));
    let session_b = Arc::new(MemoryStore::new(StoreScope::Session));
    let broadcaster_b = Arc::new(Broadcaster::new(
        Arc::new(LoopbackBus::new()),
        durable_b.clone(),
        session_b.clone(),
        clock.clone(),
    ));
    let images_b = ImageStore::new(durable_b, session_b, clock)
        .with_broadcaster(broadcaster_b);

    let self_delivered = Arc::new(AtomicUsize::new(0));
    let counter = self_delivered.clone();
    let _guard_a = broadcaster_a.subscribe(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let key = images_a.save_bytes(b"x", "image/png").unwrap().to_string();
    settle().await;

    // The fallback self-delivers on the publishing tab...
    assert_eq!(self_delivered.load(Ordering::SeqCst), 1);
    // ...but the other tab never hears about it. Documented design gap.
    assert_eq!(images_b.get(&key), None);
}

#[tokio::test]
async fn concurrent_saves_last_write_wins_per_tab() {
    let bus = BroadcastBus::new();
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_millis(0));

    let a = open_tab(&bus, clock.clone());
    let b = open_tab(&bus, clock);

    let _guard_a = a.broadcaster.subscribe(|_, _| {});
    let _guard_b = b.broadcaster.subscribe(|_, _| {});

    // Both tabs write the same key directly; the relayed copies overwrite
    // with no conflict detection.
    a.broadcaster.publish("portfolio-image-7-shared", "from-a");
    b.broadcaster.publish("portfolio-image-7-shared", "from-b");
    settle().await;

    // Each tab holds whichever relay landed; both outcomes are legal, and
    // crucially neither tab errors or detects the conflict.
    let at_a = a.durable.get("portfolio-image-7-shared").unwrap();
    let at_b = b.durable.get("portfolio-image-7-shared").unwrap();
    assert!(at_a == "from-b");
    assert!(at_b == "from-a");
}
