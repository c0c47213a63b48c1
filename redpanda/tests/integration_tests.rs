//! Integration tests for [`RedpandaEventBus`] against a real broker.
//!
//! These tests are `#[ignore]` by default: they need a Redpanda or Kafka
//! broker reachable at `LEDGERSTREAM_BROKERS` (default `localhost:9092`)
//! and take several seconds each.
//!
//! To run explicitly:
//! ```bash
//! cargo test -p ledgerstream-redpanda --test integration_tests -- --ignored
//! ```

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use futures::StreamExt;
use ledgerstream_core::event::SerializedEvent;
use ledgerstream_core::event_bus::EventBus;
use ledgerstream_redpanda::RedpandaEventBus;
use std::time::Duration;

fn brokers() -> String {
    std::env::var("LEDGERSTREAM_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string())
}

fn test_event(key: &str, data: Vec<u8>) -> SerializedEvent {
    SerializedEvent::new("Fact.v1".to_string(), key.to_string(), data, None)
}

/// Unique topic name per run so reruns do not see stale records.
fn fresh_topic(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}-{nanos}")
}

#[tokio::test]
#[ignore = "requires a running broker"]
async fn publish_subscribe_round_trip_preserves_key_and_payload() {
    let bus = RedpandaEventBus::new(&brokers()).expect("create bus");
    let topic = fresh_topic("ls-roundtrip");

    bus.publish(&topic, &test_event("acct-1", vec![1, 2, 3]))
        .await
        .expect("publish");

    let mut stream = bus.subscribe(&[&topic]).await.expect("subscribe");
    let delivered = tokio::time::timeout(Duration::from_secs(30), stream.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("delivery error");

    assert_eq!(delivered.key, "acct-1");
    assert_eq!(delivered.data, vec![1, 2, 3]);
}

#[tokio::test]
#[ignore = "requires a running broker"]
async fn earliest_offset_reset_replays_records_published_before_subscribe() {
    let bus = RedpandaEventBus::new(&brokers()).expect("create bus");
    let topic = fresh_topic("ls-replay");

    for i in 0..3u8 {
        bus.publish(&topic, &test_event("acct-1", vec![i]))
            .await
            .expect("publish");
    }

    // The subscription starts after all three records exist; the default
    // earliest policy must still deliver them.
    let mut stream = bus.subscribe(&[&topic]).await.expect("subscribe");
    let mut seen = Vec::new();
    for _ in 0..3 {
        let event = tokio::time::timeout(Duration::from_secs(30), stream.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("delivery error");
        seen.push(event.data[0]);
    }
    assert_eq!(seen, vec![0, 1, 2]);
}

#[tokio::test]
#[ignore = "requires a running broker"]
async fn same_key_records_arrive_in_publish_order() {
    let bus = RedpandaEventBus::new(&brokers()).expect("create bus");
    let topic = fresh_topic("ls-order");

    for i in 0..10u8 {
        bus.publish(&topic, &test_event("acct-9", vec![i]))
            .await
            .expect("publish");
    }

    let mut stream = bus.subscribe(&[&topic]).await.expect("subscribe");
    let mut last = None;
    for _ in 0..10 {
        let event = tokio::time::timeout(Duration::from_secs(30), stream.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("delivery error");
        assert_eq!(event.key, "acct-9");
        if let Some(prev) = last {
            assert!(event.data[0] > prev, "records for one key out of order");
        }
        last = Some(event.data[0]);
    }
}
