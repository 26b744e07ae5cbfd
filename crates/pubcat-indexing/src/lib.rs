//! Reindex pipeline for the publication catalog.
//!
//! The search index is a projection of the record store. This crate
//! backfills it: every stored publication is streamed into the index in
//! fixed-size bulk batches, with per-batch outcome counts.
//!
//! ## Key Components
//!
//! - [`ReindexJob`]: runs the `NotStarted -> EnsuringIndex -> Streaming -> Done` flow
//! - [`SyncConfig`]: batch size and reindex policy
//! - [`SyncReport`] / [`BatchReport`]: what the run did
//! - [`ProgressCallback`]: receives each batch report as it completes
//!
//! ## Example
//!
//! ```ignore
//! use pubcat_indexing::{LoggingProgressCallback, ReindexJob, SyncConfig};
//!
//! let job = ReindexJob::new(store, search, SyncConfig::default());
//! let report = job.run_blocking(LoggingProgressCallback).await?;
//! ```

pub mod error;
pub mod reindex;

pub use error::IndexingError;
pub use reindex::{
    BatchReport, LoggingProgressCallback, NoOpProgressCallback, ProgressCallback, ReindexJob,
    SyncConfig, SyncPhase, SyncReport,
};
