//! Ingest pipeline: long-lived consumer workers that keep the read model
//! in sync with the streams.
//!
//! One worker task runs per subscribed topic. Each worker consumes its
//! [`EventStream`] in delivery order, decodes the payload, and applies it to
//! the projection via the topic's policy. A failure to decode or apply one
//! event is logged, counted, and skipped; it never stops the stream and
//! never affects other topics or other keys.
//!
//! # Startup and readiness
//!
//! Subscriptions start from the earliest retained offset, so the read model
//! is deterministically rebuilt by full replay on every start. Queries are
//! answered from partial state while the replay runs; the [`ReadinessGate`]
//! flips once every worker has drained its initial backlog, detected by the
//! stream going idle for a configurable window. Callers that need complete
//! state await [`ReadinessGate::ready`] before serving.
//!
//! # Shutdown
//!
//! [`IngestPipeline::shutdown`] signals every worker and waits for them to
//! finish their in-flight apply before returning, so no event is ever left
//! half-applied.

use futures::StreamExt;
use ledgerstream_core::event::SerializedEvent;
use ledgerstream_core::event_bus::{EventBus, EventStream};
use ledgerstream_core::topic::{self, Topic};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Errors from the ingest pipeline.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Event payload could not be decoded. Recoverable: the event is
    /// skipped and ingestion continues.
    #[error("Decode failed on topic '{topic}': {reason}")]
    Decode {
        /// Topic the malformed event arrived on
        topic: String,
        /// Why decoding failed
        reason: String,
    },

    /// Event arrived on a topic the projection does not know.
    #[error("Unknown topic: {topic}")]
    UnknownTopic {
        /// The unrecognized topic name
        topic: String,
    },

    /// Could not subscribe to a topic at startup. Fatal for `start`.
    #[error("Subscription failed for topic '{topic}': {reason}")]
    Subscribe {
        /// Topic that failed to subscribe
        topic: String,
        /// Why the subscription failed
        reason: String,
    },
}

/// A projection that consumes raw stream events.
///
/// Implementations route the event by topic, decode the payload, and apply
/// it under the topic's policy (latest-value or append-history). `apply` is
/// synchronous: the store is in memory and an event's effect must be atomic
/// with respect to readers.
pub trait StreamProjection: Send + Sync + 'static {
    /// Apply one event delivered on `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Decode`] for a malformed payload and
    /// [`IngestError::UnknownTopic`] for an unrecognized stream. Both are
    /// recoverable from the pipeline's point of view.
    fn apply(&self, topic: &str, event: &SerializedEvent) -> Result<(), IngestError>;
}

/// Readiness signal for the initial replay.
///
/// Cloneable handle; `is_ready` is a cheap synchronous check, `ready` awaits
/// the flip. Once ready, the gate stays ready for the pipeline's lifetime.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    rx: watch::Receiver<bool>,
}

impl ReadinessGate {
    /// Whether the initial replay has drained on every subscribed topic.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the initial replay has drained.
    ///
    /// Returns immediately if the pipeline is already ready, or if the
    /// pipeline has shut down (there is nothing left to wait for).
    pub async fn ready(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Tracks how many topics still have replay backlog outstanding.
#[derive(Debug)]
struct ReadinessTracker {
    remaining: AtomicUsize,
    tx: watch::Sender<bool>,
}

impl ReadinessTracker {
    fn stream_caught_up(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.tx.send_replace(true);
        }
    }
}

/// Continuous background consumption of all configured streams.
///
/// Owns one worker task per topic. Workers run until the stream ends or
/// [`shutdown`](IngestPipeline::shutdown) is called.
pub struct IngestPipeline {
    shutdown_tx: watch::Sender<bool>,
    readiness: ReadinessGate,
    workers: Vec<JoinHandle<()>>,
}

impl IngestPipeline {
    /// Default idle window after which a stream is considered fully replayed.
    pub const DEFAULT_CATCHUP_IDLE: Duration = Duration::from_secs(2);

    /// Subscribe to every topic in the catalog and start consuming.
    ///
    /// Each subscription replays from the earliest retained offset (the bus
    /// is expected to be configured accordingly), rebuilding `projection`
    /// from scratch before live traffic arrives.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Subscribe`] if any topic cannot be subscribed;
    /// in that case no workers are left running.
    pub async fn start<P>(bus: Arc<dyn EventBus>, projection: Arc<P>) -> Result<Self, IngestError>
    where
        P: StreamProjection,
    {
        Self::start_with(bus, projection, &topic::ALL, Self::DEFAULT_CATCHUP_IDLE).await
    }

    /// Start consuming the given topics with an explicit catch-up idle
    /// window. Tests use a short window; production keeps the default.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Subscribe`] if any topic cannot be subscribed.
    pub async fn start_with<P>(
        bus: Arc<dyn EventBus>,
        projection: Arc<P>,
        topics: &[Topic],
        catchup_idle: Duration,
    ) -> Result<Self, IngestError>
    where
        P: StreamProjection,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = watch::channel(topics.is_empty());
        let tracker = Arc::new(ReadinessTracker {
            remaining: AtomicUsize::new(topics.len()),
            tx: ready_tx,
        });

        // Subscribe everything up front so a bad topic fails the whole start
        // instead of leaving a partially consuming pipeline behind.
        let mut streams = Vec::with_capacity(topics.len());
        for t in topics {
            let stream =
                bus.subscribe(&[t.name])
                    .await
                    .map_err(|e| IngestError::Subscribe {
                        topic: t.name.to_string(),
                        reason: e.to_string(),
                    })?;
            streams.push((*t, stream));
        }

        let workers = streams
            .into_iter()
            .map(|(t, stream)| {
                tokio::spawn(run_worker(
                    t,
                    stream,
                    Arc::clone(&projection),
                    shutdown_rx.clone(),
                    Arc::clone(&tracker),
                    catchup_idle,
                ))
            })
            .collect();

        tracing::info!(
            topics = topics.len(),
            catchup_idle_ms = catchup_idle.as_millis() as u64,
            "Ingest pipeline started"
        );

        Ok(Self {
            shutdown_tx,
            readiness: ReadinessGate { rx: ready_rx },
            workers,
        })
    }

    /// Handle to the initial-replay readiness signal.
    #[must_use]
    pub fn readiness(&self) -> ReadinessGate {
        self.readiness.clone()
    }

    /// Signal every worker to stop and wait for in-flight applies to finish.
    pub async fn shutdown(self) {
        self.shutdown_tx.send_replace(true);
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Ingest worker did not shut down cleanly");
            }
        }
        tracing::info!("Ingest pipeline stopped");
    }
}

#[allow(clippy::cognitive_complexity)]
async fn run_worker<P>(
    topic: Topic,
    mut stream: EventStream,
    projection: Arc<P>,
    mut shutdown: watch::Receiver<bool>,
    tracker: Arc<ReadinessTracker>,
    catchup_idle: Duration,
) where
    P: StreamProjection,
{
    let mut caught_up = false;

    loop {
        tokio::select! {
            maybe_event = stream.next() => match maybe_event {
                Some(Ok(event)) => {
                    match projection.apply(topic.name, &event) {
                        Ok(()) => {
                            metrics::counter!("ingest.events_applied", "topic" => topic.name)
                                .increment(1);
                            tracing::trace!(
                                topic = topic.name,
                                key = %event.key,
                                event_type = %event.event_type,
                                "Event applied"
                            );
                        }
                        Err(e) => {
                            // Recoverable: skip the event, keep the stream.
                            metrics::counter!("ingest.apply_failures", "topic" => topic.name)
                                .increment(1);
                            tracing::warn!(
                                topic = topic.name,
                                key = %event.key,
                                error = %e,
                                "Failed to apply event, skipping"
                            );
                        }
                    }
                }
                Some(Err(e)) => {
                    metrics::counter!("ingest.transport_errors", "topic" => topic.name)
                        .increment(1);
                    tracing::error!(
                        topic = topic.name,
                        error = %e,
                        "Error receiving event from bus"
                    );
                }
                None => {
                    tracing::info!(topic = topic.name, "Event stream ended");
                    break;
                }
            },

            // No event for a full idle window: the replay backlog is drained.
            () = tokio::time::sleep(catchup_idle), if !caught_up => {
                caught_up = true;
                tracker.stream_caught_up();
                tracing::info!(topic = topic.name, "Initial replay drained");
            }

            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!(topic = topic.name, "Shutdown signal received");
                    break;
                }
            }
        }
    }

    // A worker exiting before catch-up must not wedge the gate forever.
    if !caught_up {
        tracker.stream_caught_up();
    }
    tracing::debug!(topic = topic.name, "Ingest worker exiting");
}
