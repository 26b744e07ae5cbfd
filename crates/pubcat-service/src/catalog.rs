//! Create and search operations over the two adapters.
//!
//! A create writes the record store first and the search index second.
//! Nothing ties the two writes together: when the index write fails the
//! record stays stored and becomes searchable after the next reindex.

use std::sync::Arc;

use tracing::{info, warn};

use pubcat_types::{CatalogError, NewPublication, Publication, RecordStore, SearchBackend};

use crate::error::ApiError;

/// Catalog operations with constructor-injected adapters.
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    search: Arc<dyn SearchBackend>,
    search_limit: usize,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        search: Arc<dyn SearchBackend>,
        search_limit: usize,
    ) -> Self {
        Self {
            store,
            search,
            search_limit,
        }
    }

    /// Store a new publication under a fresh id, then index it.
    pub fn create(&self, draft: NewPublication) -> Result<Publication, ApiError> {
        let publication = draft.into_publication().map_err(|e| match e {
            CatalogError::InvalidInput(msg) => ApiError::InvalidPublication(msg),
            other => ApiError::InvalidPublication(other.to_string()),
        })?;

        self.store
            .put(&publication)
            .map_err(|e| ApiError::Storage(e.to_string()))?;

        if let Err(e) = self.search.index(&publication) {
            warn!(id = %publication.id, error = %e, "Publication stored but not indexed");
            return Err(ApiError::IndexWriteFailed {
                id: publication.id,
                reason: e.to_string(),
            });
        }

        info!(id = %publication.id, title = %publication.title, "Publication created");
        Ok(publication)
    }

    /// Ranked search over title and text. `None` or blank matches everything.
    pub fn search(&self, query: Option<&str>) -> Result<Vec<Publication>, ApiError> {
        let query = query.unwrap_or("");
        let results = self
            .search
            .search(query, self.search_limit)
            .map_err(|e| ApiError::Search(e.to_string()))?;

        info!(query, results = results.len(), "Search complete");
        Ok(results)
    }
}
