//! Error types for the publication catalog.

use thiserror::Error;

/// Unified error type shared across the adapter seam.
///
/// Engine-specific errors (RocksDB, Tantivy) are flattened into the
/// `Storage` and `Search` variants so callers see one opaque type.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Search index error
    #[error("Search error: {0}")]
    Search(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
