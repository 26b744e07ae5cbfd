//! Search error types.

use pubcat_types::CatalogError;
use thiserror::Error;

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Tantivy index error
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Index not found
    #[error("Index not found at path: {0}")]
    IndexNotFound(String),

    /// Index already exists
    #[error("Index already exists at path: {0}")]
    IndexAlreadyExists(String),

    /// Stored document could not be mapped back to a publication
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Schema mismatch
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Index writer is poisoned or held elsewhere
    #[error("Index is locked: {0}")]
    IndexLocked(String),
}

impl From<SearchError> for CatalogError {
    fn from(err: SearchError) -> Self {
        CatalogError::Search(err.to_string())
    }
}
