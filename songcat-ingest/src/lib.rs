//! songcat-ingest library interface
//!
//! Batch reconciliation of song-catalog records into the normalized catalog
//! database. Exposed as a library for the binary and integration tests.

pub mod db;
pub mod models;
pub mod reconcile;
pub mod supplier;
pub mod workflow;

pub use crate::models::{AlbumKey, NormalizedSongRecord};
pub use crate::supplier::RecordSupplier;
pub use crate::workflow::{ingest_batch, reconcile_batch, BatchOutcome, BatchStats, IngestTotals};
