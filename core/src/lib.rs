//! # Ledgerstream Core
//!
//! Core traits and types for the ledgerstream keyed stream projection engine.
//!
//! This crate defines the transport-agnostic abstractions the rest of the
//! workspace builds on:
//!
//! - [`event`]: the [`Event`](event::Event) trait and the
//!   [`SerializedEvent`](event::SerializedEvent) wire envelope
//! - [`event_bus`]: the [`EventBus`](event_bus::EventBus) trait that the
//!   Redpanda adapter and the in-memory test bus both implement
//! - [`topic`]: the catalog of named streams and their retention policies
//!   (compacted latest-value vs. append-history event log)
//! - [`environment`]: injected dependencies such as [`Clock`](environment::Clock)
//!
//! ## Architecture
//!
//! ```text
//! caller → Publish Gateway → EventBus (stream) → Ingest Pipeline
//!                                                      │
//!                                                      ▼
//!                                              Projection Store
//!                                                      │
//!                                                      ▼
//!                                               Query Service → caller
//! ```
//!
//! The projection store is a pure in-memory read model: it is rebuilt by
//! replaying every stream from its earliest retained event on startup, and is
//! safely discarded on shutdown.

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod event;
pub mod event_bus;
pub mod topic;

/// Environment module - dependency injection traits.
///
/// External dependencies are abstracted behind traits and injected where
/// needed, so that production code uses real implementations and tests use
/// deterministic ones.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability.
    ///
    /// The publish gateway stamps events with the injected clock so that
    /// tests can pin timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use ledgerstream_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let now = clock.now();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
