//! Keyed stream projections for the ledgerstream read model.
//!
//! # Overview
//!
//! This crate is the projection engine: it turns the ordered, partitioned,
//! keyed event streams into queryable in-memory state under two consistency
//! policies, and serves concurrent reads while ingestion keeps writing.
//!
//! - [`store`]: the concurrent projection tables ([`LatestTable`] for
//!   compacted streams, [`HistoryTable`] for event logs)
//! - [`financial`]: the read model itself, one table per stream
//! - [`pipeline`]: background consumer workers, full-replay rebuild on
//!   startup, readiness signaling and graceful shutdown
//! - [`query`]: the read-only facade (point lookups, filtered listings,
//!   aggregate statistics)
//!
//! # Consistency
//!
//! State is rebuilt from the streams on every start; nothing is persisted
//! here. Per key, applied state always reflects log order. Across keys,
//! listings may mix records from slightly different moments, which the
//! query contract allows.
//!
//! # Example
//!
//! ```ignore
//! use ledgerstream_projections::{FinancialProjections, IngestPipeline, QueryService};
//!
//! let projections = Arc::new(FinancialProjections::new());
//! let pipeline = IngestPipeline::start(event_bus, Arc::clone(&projections)).await?;
//! let query = QueryService::new(Arc::clone(&projections));
//!
//! let mut readiness = pipeline.readiness();
//! readiness.ready().await;   // full replay drained
//!
//! let balance = query.balance("A1");
//! ```

pub mod financial;
pub mod pipeline;
pub mod query;
pub mod store;

// Re-export main types for convenience
pub use financial::{FinancialProjections, RecordCounts};
pub use pipeline::{IngestError, IngestPipeline, ReadinessGate, StreamProjection};
pub use query::{BalanceStats, QueryService, TransactionStats};
pub use store::{HistoryRecord, HistoryTable, LatestTable};
