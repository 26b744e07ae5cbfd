//! Error types for the reindex pipeline.

use pubcat_types::CatalogError;
use thiserror::Error;

/// Errors that abort a reindex run.
///
/// Bulk write failures never appear here; they are counted per batch.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Reading the record store failed
    #[error("Storage error: {0}")]
    Storage(CatalogError),

    /// Checking or creating the search index failed
    #[error("Search error: {0}")]
    Search(CatalogError),

    /// The blocking reindex task panicked or was cancelled
    #[error("Reindex task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for IndexingError {
    fn from(err: tokio::task::JoinError) -> Self {
        IndexingError::Join(err.to_string())
    }
}
