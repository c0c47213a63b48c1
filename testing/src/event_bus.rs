//! In-memory event bus for fast, deterministic tests.
//!
//! Mirrors the transport contract the production bus provides: a retained,
//! ordered log per topic, at-least-once-friendly delivery, and replay from
//! the earliest retained event on every subscribe. Publishing appends to the
//! log and fans out to live subscribers; subscribing first replays the full
//! retained log, exactly like a consumer starting from the earliest offset.

use ledgerstream_core::event::SerializedEvent;
use ledgerstream_core::event_bus::{EventBus, EventBusError, EventStream};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

type Delivery = Result<SerializedEvent, EventBusError>;

#[derive(Default)]
struct TopicState {
    log: Vec<SerializedEvent>,
    subscribers: Vec<mpsc::UnboundedSender<Delivery>>,
}

/// In-memory [`EventBus`] with per-topic retained logs.
///
/// # Example
///
/// ```
/// use ledgerstream_testing::InMemoryEventBus;
/// use ledgerstream_core::event::SerializedEvent;
/// use ledgerstream_core::event_bus::EventBus;
/// use futures::StreamExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = InMemoryEventBus::new();
/// let event = SerializedEvent::new("Fact.v1".into(), "k1".into(), vec![1, 2], None);
/// bus.publish("facts", &event).await?;
///
/// // Subscribing later still sees the retained event (replay from earliest).
/// let mut stream = bus.subscribe(&["facts"]).await?;
/// let delivered = stream.next().await.transpose()?;
/// assert_eq!(delivered.map(|e| e.key), Some("k1".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct InMemoryEventBus {
    topics: Mutex<HashMap<String, TopicState>>,
}

impl InMemoryEventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events retained on a topic.
    #[must_use]
    pub fn retained(&self, topic: &str) -> usize {
        let topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics.get(topic).map_or(0, |state| state.log.len())
    }

    /// Re-deliver an already retained event to current subscribers, without
    /// appending it to the log. Simulates at-least-once redelivery.
    pub fn redeliver(&self, topic: &str, index: usize) {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(state) = topics.get_mut(topic) {
            if let Some(event) = state.log.get(index).cloned() {
                state
                    .subscribers
                    .retain(|tx| tx.send(Ok(event.clone())).is_ok());
            }
        }
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(
        &self,
        topic: &str,
        event: &SerializedEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + '_>> {
        let topic = topic.to_string();
        let event = event.clone();

        Box::pin(async move {
            let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
            let state = topics.entry(topic).or_default();
            state.log.push(event.clone());
            // Drop subscribers whose receiver is gone.
            state
                .subscribers
                .retain(|tx| tx.send(Ok(event.clone())).is_ok());
            Ok(())
        })
    }

    fn subscribe(
        &self,
        topics: &[&str],
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, EventBusError>> + Send + '_>> {
        let topics: Vec<String> = topics.iter().map(|s| (*s).to_string()).collect();

        Box::pin(async move {
            let (tx, rx) = mpsc::unbounded_channel();

            {
                let mut map = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
                for topic in &topics {
                    let state = map.entry(topic.clone()).or_default();
                    // Replay from earliest before wiring up live delivery.
                    for event in &state.log {
                        // Receiver cannot be gone yet; ignore the impossible error.
                        let _ = tx.send(Ok(event.clone()));
                    }
                    state.subscribers.push(tx.clone());
                }
            }

            let stream = async_stream::stream! {
                let mut rx = rx;
                while let Some(delivery) = rx.recv().await {
                    yield delivery;
                }
            };

            Ok(Box::pin(stream) as EventStream)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test assertions
mod tests {
    use super::*;
    use futures::StreamExt;

    fn event(key: &str, byte: u8) -> SerializedEvent {
        SerializedEvent::new("Fact.v1".to_string(), key.to_string(), vec![byte], None)
    }

    #[tokio::test]
    async fn subscribe_replays_retained_events_in_order() {
        let bus = InMemoryEventBus::new();
        bus.publish("t", &event("a", 1)).await.unwrap();
        bus.publish("t", &event("b", 2)).await.unwrap();

        let mut stream = bus.subscribe(&["t"]).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().key, "a");
        assert_eq!(stream.next().await.unwrap().unwrap().key, "b");
    }

    #[tokio::test]
    async fn live_events_reach_existing_subscribers() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.subscribe(&["t"]).await.unwrap();

        bus.publish("t", &event("live", 9)).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().key, "live");
    }

    #[tokio::test]
    async fn redeliver_duplicates_an_event_without_growing_the_log() {
        let bus = InMemoryEventBus::new();
        bus.publish("t", &event("a", 1)).await.unwrap();
        let mut stream = bus.subscribe(&["t"]).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().key, "a");

        bus.redeliver("t", 0);
        assert_eq!(stream.next().await.unwrap().unwrap().key, "a");
        assert_eq!(bus.retained("t"), 1);
    }

    #[tokio::test]
    async fn subscription_spans_multiple_topics() {
        let bus = InMemoryEventBus::new();
        bus.publish("t1", &event("a", 1)).await.unwrap();
        bus.publish("t2", &event("b", 2)).await.unwrap();

        let mut stream = bus.subscribe(&["t1", "t2"]).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        let second = stream.next().await.unwrap().unwrap();
        let mut keys = vec![first.key, second.key];
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
