//! Reindex of the search index from the record store.
//!
//! Runs once per process start. Records are loaded in full, split into
//! batches and written with one bulk request per batch. Bulk failures are
//! counted and logged, never retried.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use pubcat_types::{Publication, RecordStore, ReindexPolicy, SearchBackend, Settings};

use crate::error::IndexingError;

/// Phase of a reindex run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    NotStarted,
    EnsuringIndex,
    Streaming,
    Done,
}

/// Configuration for a reindex run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Records per bulk request.
    pub batch_size: usize,
    /// Whether an existing index is streamed into again.
    pub policy: ReindexPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            policy: ReindexPolicy::IfMissing,
        }
    }
}

impl SyncConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            batch_size: settings.reindex_batch_size,
            policy: settings.reindex_policy,
        }
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the reindex policy.
    pub fn with_policy(mut self, policy: ReindexPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Outcome of a single bulk batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// 1-based batch number
    pub ordinal: usize,
    pub submitted: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    /// Index document count after the refresh, when it could be read
    pub doc_count: Option<u64>,
}

/// Result of a reindex run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub phase: SyncPhase,
    /// The index did not exist and was created by this run
    pub index_created: bool,
    /// Streaming was skipped because the index already existed
    pub skipped: bool,
    pub records_loaded: usize,
    pub batches: Vec<BatchReport>,
    pub elapsed_ms: u64,
}

impl SyncReport {
    fn new() -> Self {
        Self {
            phase: SyncPhase::NotStarted,
            index_created: false,
            skipped: false,
            records_loaded: 0,
            batches: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn created(&self) -> usize {
        self.batches.iter().map(|b| b.created).sum()
    }

    pub fn updated(&self) -> usize {
        self.batches.iter().map(|b| b.updated).sum()
    }

    pub fn failed(&self) -> usize {
        self.batches.iter().map(|b| b.failed).sum()
    }
}

/// Trait for receiving reindex progress updates.
pub trait ProgressCallback: Send {
    /// Called after each batch has been written and refreshed.
    fn on_batch(&self, report: &BatchReport);
}

/// A no-op progress callback for when progress reporting isn't needed.
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_batch(&self, _report: &BatchReport) {}
}

/// A callback that logs each batch at info level.
pub struct LoggingProgressCallback;

impl ProgressCallback for LoggingProgressCallback {
    fn on_batch(&self, report: &BatchReport) {
        info!(
            batch = report.ordinal,
            submitted = report.submitted,
            created = report.created,
            updated = report.updated,
            failed = report.failed,
            "Reindex progress"
        );
    }
}

/// Backfills the search index from the record store.
pub struct ReindexJob {
    store: Arc<dyn RecordStore>,
    search: Arc<dyn SearchBackend>,
    config: SyncConfig,
    phase: SyncPhase,
}

impl ReindexJob {
    pub fn new(
        store: Arc<dyn RecordStore>,
        search: Arc<dyn SearchBackend>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            search,
            config,
            phase: SyncPhase::NotStarted,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    fn enter(&mut self, phase: SyncPhase, report: &mut SyncReport) {
        info!(from = ?self.phase, to = ?phase, index = self.search.index_name(), "Reindex phase");
        self.phase = phase;
        report.phase = phase;
    }

    /// Run the reindex to completion on the current thread.
    pub fn run<P: ProgressCallback + ?Sized>(
        &mut self,
        progress: &P,
    ) -> Result<SyncReport, IndexingError> {
        let started = Instant::now();
        let mut report = SyncReport::new();

        self.enter(SyncPhase::EnsuringIndex, &mut report);
        let exists = self.search.exists().map_err(IndexingError::Search)?;
        if exists {
            match self.config.policy {
                ReindexPolicy::IfMissing => {
                    info!(
                        index = self.search.index_name(),
                        "Search index already exists, skipping reindex"
                    );
                    report.skipped = true;
                    self.enter(SyncPhase::Done, &mut report);
                    report.elapsed_ms = started.elapsed().as_millis() as u64;
                    return Ok(report);
                }
                ReindexPolicy::Always => {
                    info!(index = self.search.index_name(), "Reindexing existing search index");
                }
            }
        } else {
            self.search.create().map_err(IndexingError::Search)?;
            report.index_created = true;
            info!(index = self.search.index_name(), "Created search index");
        }

        self.enter(SyncPhase::Streaming, &mut report);
        let records = self.store.get_all().map_err(IndexingError::Storage)?;
        report.records_loaded = records.len();
        info!(count = records.len(), "Loaded publications for reindex");

        let batch_size = self.config.batch_size.max(1);
        for (i, batch) in records.chunks(batch_size).enumerate() {
            let batch_report = self.write_batch(i + 1, batch);
            progress.on_batch(&batch_report);
            report.batches.push(batch_report);
        }

        self.enter(SyncPhase::Done, &mut report);
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            records = report.records_loaded,
            batches = report.batches.len(),
            created = report.created(),
            updated = report.updated(),
            failed = report.failed(),
            elapsed_ms = report.elapsed_ms,
            "Reindex complete"
        );
        Ok(report)
    }

    fn write_batch(&self, ordinal: usize, batch: &[Publication]) -> BatchReport {
        let mut batch_report = BatchReport {
            ordinal,
            submitted: batch.len(),
            ..Default::default()
        };

        match self.search.bulk(batch) {
            Ok(response) => {
                for (id, reason) in response.errors() {
                    warn!(batch = ordinal, id, reason, "Bulk item failed");
                }
                batch_report.created = response.created();
                batch_report.updated = response.updated();
                batch_report.failed = response.failed();
                info!(
                    batch = ordinal,
                    added = batch_report.created + batch_report.updated,
                    "Bulk write complete"
                );
            }
            Err(e) => {
                warn!(batch = ordinal, error = %e, "Bulk write failed, counting batch as failed");
                batch_report.failed = batch.len();
            }
        }

        if let Err(e) = self.search.refresh() {
            warn!(batch = ordinal, error = %e, "Index refresh failed");
        }

        match self.search.count() {
            Ok(count) => {
                info!(count, index = self.search.index_name(), "Search index document count");
                batch_report.doc_count = Some(count);
            }
            Err(e) => warn!(error = %e, "Failed to count search index documents"),
        }

        batch_report
    }

    /// Run the reindex on a blocking thread and wait for it.
    pub async fn run_blocking<P>(mut self, progress: P) -> Result<SyncReport, IndexingError>
    where
        P: ProgressCallback + 'static,
    {
        tokio::task::spawn_blocking(move || self.run(&progress)).await?
    }
}
