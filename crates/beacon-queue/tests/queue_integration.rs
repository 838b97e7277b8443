//! End-to-end queue behavior across threads, settings, and transports.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use proptest::prelude::*;
use tokio::runtime::Runtime;

use beacon_core::{EventRecord, FlushReason, PropertyValue, StaticIdentifiers};
use beacon_queue::{
    ChannelSender, EventQueue, EventSender, FlushBatch, LifecycleHub, LifecycleSignal,
    QueueConfig, SendOutcome,
};
use beacon_settings::load_settings_from_path;

type Batches = Arc<Mutex<Vec<FlushBatch>>>;

fn recording() -> (Arc<dyn EventSender>, Batches) {
    let batches: Batches = Arc::default();
    let sink = Arc::clone(&batches);
    let sender: Arc<dyn EventSender> = Arc::new(move |batch: FlushBatch| {
        sink.lock().push(batch);
        SendOutcome::Accepted
    });
    (sender, batches)
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn config(threshold: usize) -> QueueConfig {
    QueueConfig {
        flush_threshold: threshold,
        flush_interval: Duration::from_secs(3600),
        log_interval: None,
    }
}

// ── concurrency ──────────────────────────────────────────────────────

#[test]
fn concurrent_producers_lose_nothing() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 500;

    let rt = runtime();
    let _guard = rt.enter();
    let (sender, batches) = recording();
    let queue = EventQueue::new(config(7), sender);

    thread::scope(|scope| {
        for producer in 0..PRODUCERS {
            let queue = &queue;
            let _ = scope.spawn(move || {
                for n in 0..PER_PRODUCER {
                    let event = EventRecord::builder("tap")
                        .property("producer", i64::try_from(producer).unwrap())
                        .property("n", i64::try_from(n).unwrap())
                        .build()
                        .unwrap();
                    queue.add_event(event).unwrap();
                }
            });
        }
        let queue = &queue;
        let _ = scope.spawn(move || {
            for _ in 0..200 {
                queue.flush(FlushReason::ForcedFlush);
                thread::yield_now();
            }
        });
    });

    let mut sent = batches.lock().clone();
    let pending = queue.snapshot().pending;
    let delivered: usize = sent.iter().map(FlushBatch::len).sum();
    assert_eq!(delivered + pending, PRODUCERS * PER_PRODUCER);

    sent.sort_by_key(|b| b.sequence);
    let sequences: Vec<u64> = sent.iter().map(|b| b.sequence).collect();
    let expected: Vec<u64> = (1..=u64::try_from(sent.len()).unwrap()).collect();
    assert_eq!(sequences, expected);

    let mut last_seen: HashMap<i64, i64> = HashMap::new();
    for event in sent.iter().flat_map(|b| b.events.iter()) {
        let Some(PropertyValue::Int(producer)) = event.property("producer") else {
            panic!("missing producer");
        };
        let Some(PropertyValue::Int(n)) = event.property("n") else {
            panic!("missing n");
        };
        if let Some(prev) = last_seen.insert(*producer, *n) {
            assert!(*n > prev, "producer {producer} out of order: {prev} then {n}");
        }
    }
}

// ── threshold property ───────────────────────────────────────────────

proptest! {
    #[test]
    fn threshold_flush_count_matches(threshold in 1usize..20, count in 0usize..120) {
        let rt = runtime();
        let _guard = rt.enter();
        let (sender, batches) = recording();
        let queue = EventQueue::new(config(threshold), sender);

        for i in 0..count {
            queue.add_event(EventRecord::new(format!("e{i}")).unwrap()).unwrap();
        }

        let sent = batches.lock();
        prop_assert_eq!(sent.len(), count / threshold);
        prop_assert!(sent.iter().all(|b| b.len() == threshold));
        prop_assert!(sent.iter().all(|b| b.reason == FlushReason::ThresholdReached));

        let snapshot = queue.snapshot();
        prop_assert_eq!(snapshot.pending, count % threshold);
        prop_assert_eq!(snapshot.remaining_until_threshold, threshold - count % threshold);
    }
}

// ── transports ───────────────────────────────────────────────────────

#[tokio::test]
async fn channel_sender_delivers_batches_to_transport() {
    let (sender, mut rx) = ChannelSender::new(8);
    let queue = EventQueue::new(config(2), Arc::new(sender));
    let identifiers = StaticIdentifiers::local();

    for name in ["open", "tap", "close"] {
        let event = EventRecord::builder(name)
            .property("screen", "home")
            .enrich(&identifiers)
            .build()
            .unwrap();
        queue.add_event(event).unwrap();
    }
    queue.shutdown();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.names(), vec!["open", "tap"]);
    assert_eq!(first.reason, FlushReason::ThresholdReached);

    let json = serde_json::to_value(&first).unwrap();
    assert_eq!(json["reason"], "threshold_reached");
    assert_eq!(json["sequence"], 1);
    assert_eq!(json["events"][0]["name"], "open");
    assert!(json.get("flushedAt").is_some());

    let last = rx.recv().await.unwrap();
    assert_eq!(last.names(), vec!["close"]);
    assert_eq!(last.reason, FlushReason::ForcedFlush);
}

#[tokio::test]
async fn full_transport_does_not_block_the_queue() {
    let (sender, mut rx) = ChannelSender::new(1);
    let queue = EventQueue::new(config(1), Arc::new(sender));

    for name in ["A", "B", "C"] {
        queue.add_event(EventRecord::new(name).unwrap()).unwrap();
    }

    assert_eq!(rx.recv().await.unwrap().names(), vec!["A"]);
    assert!(rx.try_recv().is_err());
    assert_eq!(queue.snapshot().flushes, 3);
}

// ── settings ─────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_file_drives_queue_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"queue": {"flushThreshold": 2, "flushIntervalSecs": 0, "logIntervalSecs": 30}}"#,
    )
    .unwrap();

    let settings = load_settings_from_path(&path).unwrap();
    let (sender, batches) = recording();
    let queue = EventQueue::from_settings(Some(&settings.queue), sender);

    assert_eq!(queue.config().flush_threshold, 2);
    assert_eq!(queue.config().flush_interval, Duration::from_secs(15));
    assert_eq!(queue.config().log_interval, Some(Duration::from_secs(30)));

    queue.add_event(EventRecord::new("A").unwrap()).unwrap();
    queue.add_event(EventRecord::new("B").unwrap()).unwrap();
    assert_eq!(batches.lock().len(), 1);
}

// ── timer and lifecycle ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn idle_queue_sends_empty_timer_batches() {
    let (sender, batches) = recording();
    let queue = EventQueue::new(
        QueueConfig {
            flush_interval: Duration::from_secs(15),
            ..config(100)
        },
        sender,
    );

    tokio::time::sleep(Duration::from_millis(45_500)).await;

    {
        let sent = batches.lock();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|b| b.reason == FlushReason::Timer && b.is_empty()));
    }

    drop(queue);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(batches.lock().len(), 3);
}

#[tokio::test]
async fn background_then_foreground_flushes_twice() {
    let (sender, batches) = recording();
    let queue = EventQueue::new(config(100), sender);
    let hub = LifecycleHub::new();
    queue.attach_lifecycle(&hub);

    queue.add_event(EventRecord::new("A").unwrap()).unwrap();
    hub.emit(LifecycleSignal::Backgrounded);
    hub.emit(LifecycleSignal::Foregrounded);

    let sent = batches.lock();
    let reasons: Vec<_> = sent.iter().map(|b| b.reason).collect();
    assert_eq!(
        reasons,
        vec![FlushReason::AppBackgrounded, FlushReason::AppForegrounded]
    );
    assert_eq!(sent[0].names(), vec!["A"]);
    assert!(sent[1].is_empty());
}
