//! Event bus abstraction over the external stream transport.
//!
//! The [`EventBus`] trait is the boundary with the broker: the gateway
//! publishes through it, the ingest pipeline subscribes through it. The
//! transport is expected to provide ordered, at-least-once delivery per
//! partition key and to support replay from the earliest retained offset.
//!
//! # Key Principles
//!
//! - **At-least-once delivery**: events may be delivered more than once;
//!   consumers must be idempotent
//! - **Ordered per key**: events sharing a partition key arrive in log order;
//!   cross-key ordering is unconstrained
//! - **Replay from earliest**: subscribing starts from the first retained
//!   event so projections can be rebuilt deterministically
//!
//! # Implementations
//!
//! - `RedpandaEventBus` (ledgerstream-redpanda) - production, Kafka-compatible
//! - `InMemoryEventBus` (ledgerstream-testing) - fast, deterministic tests

use crate::event::SerializedEvent;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during event bus operations.
#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    /// Failed to connect to the event bus
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Failed to publish an event to a topic
    #[error("Publish failed for topic '{topic}': {reason}")]
    PublishFailed {
        /// The topic that failed
        topic: String,
        /// The reason for failure
        reason: String,
    },

    /// Failed to subscribe to topics
    #[error("Subscription failed for topics {topics:?}: {reason}")]
    SubscriptionFailed {
        /// The topics that failed to subscribe
        topics: Vec<String>,
        /// The reason for failure
        reason: String,
    },

    /// Failed to deserialize an event
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Network or transport error
    #[error("Transport error: {0}")]
    TransportError(String),
}

/// Stream of events from a subscription.
///
/// Each item is a `Result`: transport and framing errors surface in-band so a
/// consumer can log and keep reading rather than tearing down the stream.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<SerializedEvent, EventBusError>> + Send>>;

/// Trait for event bus implementations.
///
/// # Dyn Compatibility
///
/// Methods return explicit `Pin<Box<dyn Future>>` instead of `async fn` so
/// the bus can be held as `Arc<dyn EventBus>` by the gateway and the ingest
/// pipeline.
pub trait EventBus: Send + Sync {
    /// Publish an event to a topic.
    ///
    /// The event's partition key determines the partition and therefore the
    /// ordering domain. Delivery is at-least-once: the same event may reach
    /// consumers more than once.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::PublishFailed`] if the transport rejects the
    /// record or times out. The bus does not retry; retry policy belongs to
    /// transport configuration.
    fn publish(
        &self,
        topic: &str,
        event: &SerializedEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + '_>>;

    /// Subscribe to one or more topics and receive a stream of events.
    ///
    /// The subscription replays from the earliest retained offset so a fresh
    /// consumer rebuilds full state before seeing live traffic.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::SubscriptionFailed`] if the consumer cannot
    /// be created or the topics cannot be subscribed.
    fn subscribe(
        &self,
        topics: &[&str],
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, EventBusError>> + Send + '_>>;
}
