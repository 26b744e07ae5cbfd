//! Search indexer for writing publications to the Tantivy index.
//!
//! The indexer wraps IndexWriter with shared access via Arc<Mutex>.
//! Documents are not visible until commit() is called and the reader
//! reloads.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tantivy::{IndexWriter, Term};
use tracing::{debug, info, warn};

use pubcat_types::{BulkItem, Publication};

use crate::document::publication_to_doc;
use crate::error::SearchError;
use crate::index::SearchIndex;
use crate::schema::PublicationSchema;

/// Manages document indexing operations.
pub struct SearchIndexer {
    writer: Arc<Mutex<IndexWriter>>,
    schema: PublicationSchema,
}

impl SearchIndexer {
    /// Create a new indexer from a SearchIndex.
    pub fn new(index: &SearchIndex) -> Result<Self, SearchError> {
        let writer = index.writer()?;
        let schema = index.schema().clone();

        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            schema,
        })
    }

    /// Index a publication.
    ///
    /// If a document with the same id exists, it will be replaced.
    pub fn upsert(&self, publication: &Publication) -> Result<(), SearchError> {
        if publication.id.is_empty() {
            return Err(SearchError::InvalidDocument("missing identifier".into()));
        }

        let writer = self
            .writer
            .lock()
            .map_err(|e| SearchError::IndexLocked(e.to_string()))?;

        let term = Term::from_field_text(self.schema.doc_id, &publication.id);
        writer.delete_term(term);
        writer.add_document(publication_to_doc(&self.schema, publication))?;

        debug!(id = %publication.id, "Indexed publication");
        Ok(())
    }

    /// Index a batch of publications under one writer lock.
    ///
    /// `is_indexed` reports whether an id is already visible in the index; it
    /// decides between a created and an updated outcome. Ids repeated within
    /// the batch count as updates after their first occurrence.
    pub fn index_batch(
        &self,
        publications: &[Publication],
        is_indexed: impl Fn(&str) -> bool,
    ) -> Result<Vec<BulkItem>, SearchError> {
        let writer = self
            .writer
            .lock()
            .map_err(|e| SearchError::IndexLocked(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(publications.len());
        for publication in publications {
            if publication.id.is_empty() {
                items.push(BulkItem::failed("", "missing identifier"));
                continue;
            }

            let existed = seen.contains(publication.id.as_str()) || is_indexed(&publication.id);

            let term = Term::from_field_text(self.schema.doc_id, &publication.id);
            writer.delete_term(term);
            match writer.add_document(publication_to_doc(&self.schema, publication)) {
                Ok(_) => {
                    seen.insert(publication.id.as_str());
                    items.push(if existed {
                        BulkItem::updated(publication.id.as_str())
                    } else {
                        BulkItem::created(publication.id.as_str())
                    });
                }
                Err(e) => items.push(BulkItem::failed(publication.id.as_str(), e.to_string())),
            }
        }

        debug!(count = items.len(), "Indexed publication batch");
        Ok(items)
    }

    /// Commit pending changes to make them searchable.
    pub fn commit(&self) -> Result<u64, SearchError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| SearchError::IndexLocked(e.to_string()))?;

        let opstamp = writer.commit()?;
        info!(opstamp, "Committed index changes");
        Ok(opstamp)
    }

    /// Rollback uncommitted changes.
    pub fn rollback(&self) -> Result<u64, SearchError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| SearchError::IndexLocked(e.to_string()))?;

        let opstamp = writer.rollback()?;
        warn!(opstamp, "Rolled back index changes");
        Ok(opstamp)
    }
}
