//! `SearchBackend` implementation over an embedded Tantivy index.
//!
//! The backend opens the target index lazily. Reads against a missing
//! index return empty results; writes create it first.

use std::sync::{RwLock, RwLockReadGuard};

use tracing::{debug, info, warn};

use pubcat_types::{BulkResponse, CatalogError, Publication, SearchBackend};

use crate::error::SearchError;
use crate::index::{SearchIndex, SearchIndexConfig};
use crate::indexer::SearchIndexer;
use crate::searcher::PublicationSearcher;

struct OpenIndex {
    indexer: SearchIndexer,
    searcher: PublicationSearcher,
}

impl OpenIndex {
    fn from_index(index: SearchIndex) -> Result<Self, SearchError> {
        Ok(Self {
            indexer: SearchIndexer::new(&index)?,
            searcher: PublicationSearcher::new(&index)?,
        })
    }

    /// Commit pending writes. On failure the pending writes are discarded
    /// so a later commit cannot publish them.
    fn commit_or_rollback(&self) -> Result<(), SearchError> {
        if let Err(e) = self.indexer.commit() {
            warn!(error = %e, "Index commit failed, discarding pending writes");
            if let Err(rollback_err) = self.indexer.rollback() {
                warn!(error = %rollback_err, "Index rollback failed");
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Search index adapter backed by Tantivy.
pub struct TantivyBackend {
    config: SearchIndexConfig,
    state: RwLock<Option<OpenIndex>>,
}

impl TantivyBackend {
    /// Create a backend for the configured index. Touches no files.
    pub fn new(config: SearchIndexConfig) -> Self {
        Self {
            config,
            state: RwLock::new(None),
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, Option<OpenIndex>>, SearchError> {
        self.state
            .read()
            .map_err(|e| SearchError::IndexLocked(e.to_string()))
    }

    /// Open the index if it exists on disk. Returns false when it does not.
    fn ensure_open(&self) -> Result<bool, SearchError> {
        if self.read_state()?.is_some() {
            return Ok(true);
        }
        if !self.config.index_exists() {
            return Ok(false);
        }

        let mut state = self
            .state
            .write()
            .map_err(|e| SearchError::IndexLocked(e.to_string()))?;
        if state.is_none() {
            *state = Some(OpenIndex::from_index(SearchIndex::open(self.config.clone())?)?);
        }
        Ok(true)
    }

    /// Open the index, creating it when it is missing.
    fn ensure_created(&self) -> Result<(), SearchError> {
        if self.ensure_open()? {
            return Ok(());
        }
        match self.create_index() {
            Ok(()) | Err(SearchError::IndexAlreadyExists(_)) => {
                self.ensure_open()?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn create_index(&self) -> Result<(), SearchError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| SearchError::IndexLocked(e.to_string()))?;
        if state.is_some() {
            return Err(SearchError::IndexAlreadyExists(
                self.config.index_path().display().to_string(),
            ));
        }
        let index = SearchIndex::create(self.config.clone())?;
        *state = Some(OpenIndex::from_index(index)?);
        Ok(())
    }

    fn with_open<T>(
        &self,
        default: T,
        f: impl FnOnce(&OpenIndex) -> Result<T, SearchError>,
    ) -> Result<T, SearchError> {
        if !self.ensure_open()? {
            return Ok(default);
        }
        match self.read_state()?.as_ref() {
            Some(open) => f(open),
            None => Ok(default),
        }
    }

    fn with_created<T>(
        &self,
        f: impl FnOnce(&OpenIndex) -> Result<T, SearchError>,
    ) -> Result<T, SearchError> {
        self.ensure_created()?;
        let state = self.read_state()?;
        let open = state
            .as_ref()
            .ok_or_else(|| SearchError::IndexNotFound(self.config.index_path().display().to_string()))?;
        f(open)
    }
}

impl SearchBackend for TantivyBackend {
    fn index_name(&self) -> &str {
        &self.config.index_name
    }

    fn exists(&self) -> Result<bool, CatalogError> {
        Ok(self.read_state()?.is_some() || self.config.index_exists())
    }

    fn create(&self) -> Result<(), CatalogError> {
        if self.config.index_exists() {
            return Err(SearchError::IndexAlreadyExists(
                self.config.index_path().display().to_string(),
            )
            .into());
        }
        self.create_index()?;
        info!(index = %self.config.index_name, "Search index created");
        Ok(())
    }

    fn index(&self, publication: &Publication) -> Result<(), CatalogError> {
        self.with_created(|open| {
            open.indexer.upsert(publication)?;
            open.commit_or_rollback()?;
            open.searcher.reload()
        })?;
        Ok(())
    }

    fn bulk(&self, publications: &[Publication]) -> Result<BulkResponse, CatalogError> {
        let items = self.with_created(|open| {
            let items = open
                .indexer
                .index_batch(publications, |id| open.searcher.contains(id).unwrap_or(false))?;
            open.commit_or_rollback()?;
            Ok(items)
        })?;
        let response = BulkResponse::new(items);
        debug!(
            created = response.created(),
            updated = response.updated(),
            failed = response.failed(),
            "Bulk write complete"
        );
        Ok(response)
    }

    fn refresh(&self) -> Result<(), CatalogError> {
        self.with_open((), |open| open.searcher.reload())?;
        Ok(())
    }

    fn count(&self) -> Result<u64, CatalogError> {
        Ok(self.with_open(0, |open| Ok(open.searcher.num_docs()))?)
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Publication>, CatalogError> {
        Ok(self.with_open(Vec::new(), |open| open.searcher.search(query, limit))?)
    }
}
