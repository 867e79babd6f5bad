//! Batch workflow orchestration
//!
//! One invocation per batch: reconcile, then commit or roll back as a unit.

pub mod pipeline;
pub mod statistics;

pub use pipeline::{ingest_batch, reconcile_batch, BatchOutcome};
pub use statistics::{BatchStats, IngestTotals};
