//! Event trait and the wire envelope for keyed domain events.
//!
//! Events are immutable facts about the financial domain (a balance changed,
//! a transaction happened, a notification was raised). Each event carries a
//! **partition key** that determines its ordering domain: the transport
//! guarantees delivery order only between events that share a key.
//!
//! # Serialization
//!
//! Event payloads are serialized with `bincode` for compact, fast framing.
//! The envelope keeps the event type name and the key alongside the payload
//! so consumers can route and decode without guessing.
//!
//! # Example
//!
//! ```
//! use ledgerstream_core::event::Event;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct BalanceChanged { account_id: String, amount_cents: i64 }
//!
//! impl Event for BalanceChanged {
//!     fn event_type(&self) -> &'static str { "BalanceChanged.v1" }
//!     fn partition_key(&self) -> &str { &self.account_id }
//! }
//! ```

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use thiserror::Error;

/// Error types for event (de)serialization.
#[derive(Error, Debug)]
pub enum EventError {
    /// Failed to serialize event to bytes.
    #[error("Failed to serialize event: {0}")]
    SerializationError(String),

    /// Failed to deserialize event from bytes.
    #[error("Failed to deserialize event: {0}")]
    DeserializationError(String),

    /// Unknown event type encountered during deserialization.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}

/// An immutable domain fact that can be published to a stream and replayed
/// to reconstruct projection state.
///
/// # Event Naming Convention
///
/// `event_type()` returns a stable, versioned identifier (`"Balance.v1"`)
/// used for routing and schema evolution.
///
/// # Partition Key
///
/// `partition_key()` selects the ordering domain for the event:
///
/// - latest-value (compacted) streams key by the logical entity (account id),
///   so the newest event per entity survives compaction;
/// - append-history streams key by the record's own identifier, so every
///   fact is retained individually.
///
/// # Thread Safety
///
/// Events must be `Send + Sync + 'static` to cross task boundaries.
pub trait Event: Send + Sync + 'static {
    /// Returns the versioned event type identifier for this event.
    fn event_type(&self) -> &'static str;

    /// Returns the partition key that scopes ordering for this event.
    fn partition_key(&self) -> &str;

    /// Serialize this event to bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::SerializationError`] if the event cannot be
    /// serialized, which is rare with bincode.
    fn to_bytes(&self) -> Result<Vec<u8>, EventError>
    where
        Self: Serialize,
    {
        bincode::serialize(self).map_err(|e| EventError::SerializationError(e.to_string()))
    }

    /// Deserialize an event from bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DeserializationError`] if the bytes are
    /// corrupted, truncated, or belong to a different event type.
    fn from_bytes(bytes: &[u8]) -> Result<Self, EventError>
    where
        Self: DeserializeOwned + Sized,
    {
        bincode::deserialize(bytes).map_err(|e| EventError::DeserializationError(e.to_string()))
    }
}

/// A serialized event ready for the transport.
///
/// This is the wire envelope: event type for routing, partition key for
/// ordering, bincode payload, and optional JSON metadata (correlation ids,
/// originating user, and similar). The envelope itself is serde-able because
/// the transport bincode-frames it whole onto the broker record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializedEvent {
    /// The event type identifier (e.g., "Transaction.v1").
    pub event_type: String,

    /// The partition key the transport orders by.
    pub key: String,

    /// The bincode-serialized event payload.
    pub data: Vec<u8>,

    /// Optional metadata as JSON.
    pub metadata: Option<serde_json::Value>,
}

impl SerializedEvent {
    /// Create a new serialized event.
    #[must_use]
    pub const fn new(
        event_type: String,
        key: String,
        data: Vec<u8>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            event_type,
            key,
            data,
            metadata,
        }
    }

    /// Create a serialized event from an [`Event`], taking the type and key
    /// from the event itself.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::SerializationError`] if the payload cannot be
    /// serialized.
    pub fn from_event<E: Event + Serialize>(
        event: &E,
        metadata: Option<serde_json::Value>,
    ) -> Result<Self, EventError> {
        Ok(Self {
            event_type: event.event_type().to_string(),
            key: event.partition_key().to_string(),
            data: event.to_bytes()?,
            metadata,
        })
    }

    /// Decode the payload back into a concrete event type.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DeserializationError`] on a malformed payload.
    pub fn decode<E: Event + DeserializeOwned>(&self) -> Result<E, EventError> {
        E::from_bytes(&self.data)
    }
}

impl fmt::Display for SerializedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SerializedEvent {{ type: {}, key: {}, size: {} bytes }}",
            self.event_type,
            self.key,
            self.data.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
    struct TestFact {
        id: String,
        value: i32,
    }

    impl Event for TestFact {
        fn event_type(&self) -> &'static str {
            "TestFact.v1"
        }

        fn partition_key(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn event_type_and_key_are_exposed() {
        let event = TestFact {
            id: "acc-1".to_string(),
            value: 42,
        };
        assert_eq!(event.event_type(), "TestFact.v1");
        assert_eq!(event.partition_key(), "acc-1");
    }

    #[test]
    #[allow(clippy::expect_used)] // Panics: Test will fail if serialization fails
    fn event_serialization_roundtrip() {
        let event = TestFact {
            id: "acc-1".to_string(),
            value: 42,
        };

        let bytes = event.to_bytes().expect("serialization should succeed");
        let deserialized = TestFact::from_bytes(&bytes).expect("deserialization should succeed");

        assert_eq!(event, deserialized);
    }

    #[test]
    #[allow(clippy::expect_used)] // Panics: Test will fail if serialization fails
    fn serialized_event_carries_key_from_event() {
        let event = TestFact {
            id: "acc-7".to_string(),
            value: 100,
        };

        let metadata = serde_json::json!({ "user_id": "user-123" });
        let serialized = SerializedEvent::from_event(&event, Some(metadata.clone()))
            .expect("serialization should succeed");

        assert_eq!(serialized.event_type, "TestFact.v1");
        assert_eq!(serialized.key, "acc-7");
        assert!(!serialized.data.is_empty());
        assert_eq!(serialized.metadata, Some(metadata));
    }

    #[test]
    #[allow(clippy::expect_used)] // Panics: Test will fail if serialization fails
    fn decode_rejects_malformed_payload() {
        let event = TestFact {
            id: "acc-1".to_string(),
            value: 1,
        };
        let mut serialized =
            SerializedEvent::from_event(&event, None).expect("serialization should succeed");
        serialized.data.truncate(1);

        assert!(serialized.decode::<TestFact>().is_err());
    }

    #[test]
    #[allow(clippy::expect_used)] // Panics: Test will fail if serialization fails
    fn envelope_survives_bincode_framing() {
        // The transport frames the whole envelope with bincode; the key and
        // metadata must come back intact alongside the payload.
        let event = TestFact {
            id: "acc-3".to_string(),
            value: 9,
        };
        let envelope =
            SerializedEvent::from_event(&event, Some(serde_json::json!({ "origin": "test" })))
                .expect("serialization should succeed");

        let framed = bincode::serialize(&envelope).expect("framing should succeed");
        let unframed: SerializedEvent =
            bincode::deserialize(&framed).expect("unframing should succeed");

        assert_eq!(unframed.event_type, envelope.event_type);
        assert_eq!(unframed.key, "acc-3");
        assert_eq!(unframed.metadata, envelope.metadata);
        assert_eq!(
            unframed.decode::<TestFact>().expect("payload should decode"),
            event
        );
    }

    #[test]
    fn serialized_event_display() {
        let serialized = SerializedEvent::new(
            "TestFact.v1".to_string(),
            "acc-1".to_string(),
            vec![1, 2, 3, 4, 5],
            None,
        );

        let display = format!("{serialized}");
        assert!(display.contains("TestFact.v1"));
        assert!(display.contains("5 bytes"));
    }
}
