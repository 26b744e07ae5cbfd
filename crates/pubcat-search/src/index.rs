//! Tantivy index management.
//!
//! Each named index lives in its own directory under a common root.

use std::path::{Path, PathBuf};

use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy};
use tracing::{debug, info};

use crate::error::SearchError;
use crate::schema::{build_publication_schema, PublicationSchema};

/// Default memory budget for IndexWriter (50MB)
const DEFAULT_WRITER_MEMORY_MB: usize = 50;

/// Default index name
const DEFAULT_INDEX_NAME: &str = "publications2";

/// Search index configuration
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Root directory holding named indexes
    pub index_root: PathBuf,
    /// Name of the target index
    pub index_name: String,
    /// Memory budget for writer in MB
    pub writer_memory_mb: usize,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            index_root: PathBuf::from("./search"),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            writer_memory_mb: DEFAULT_WRITER_MEMORY_MB,
        }
    }
}

impl SearchIndexConfig {
    pub fn new(index_root: impl Into<PathBuf>) -> Self {
        Self {
            index_root: index_root.into(),
            ..Default::default()
        }
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    pub fn with_memory_mb(mut self, mb: usize) -> Self {
        self.writer_memory_mb = mb;
        self
    }

    /// Directory of the target index
    pub fn index_path(&self) -> PathBuf {
        self.index_root.join(&self.index_name)
    }

    /// Check if the target index exists on disk
    pub fn index_exists(&self) -> bool {
        index_exists_at(&self.index_path())
    }
}

/// Wrapper for Tantivy index with schema access.
pub struct SearchIndex {
    index: Index,
    schema: PublicationSchema,
    config: SearchIndexConfig,
}

impl SearchIndex {
    /// Create the target index. Fails if it already exists.
    pub fn create(config: SearchIndexConfig) -> Result<Self, SearchError> {
        let path = config.index_path();
        if index_exists_at(&path) {
            return Err(SearchError::IndexAlreadyExists(path.display().to_string()));
        }

        std::fs::create_dir_all(&path)?;
        let schema = build_publication_schema();
        let index = Index::create_in_dir(&path, schema.schema().clone())?;
        info!(path = ?path, index = %config.index_name, "Created search index");

        Ok(Self {
            index,
            schema,
            config,
        })
    }

    /// Open an existing index. Fails if it does not exist.
    pub fn open(config: SearchIndexConfig) -> Result<Self, SearchError> {
        let path = config.index_path();
        if !index_exists_at(&path) {
            return Err(SearchError::IndexNotFound(path.display().to_string()));
        }

        let index = Index::open_in_dir(&path)?;
        let schema = PublicationSchema::from_schema(index.schema())?;
        debug!(path = ?path, "Opened search index");

        Ok(Self {
            index,
            schema,
            config,
        })
    }

    /// Get the search schema
    pub fn schema(&self) -> &PublicationSchema {
        &self.schema
    }

    /// Get the underlying Tantivy index
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Create an IndexWriter with configured memory budget
    pub fn writer(&self) -> Result<IndexWriter, SearchError> {
        let memory_budget = self.config.writer_memory_mb * 1024 * 1024;
        let writer = self.index.writer(memory_budget)?;
        debug!(
            memory_mb = self.config.writer_memory_mb,
            "Created index writer"
        );
        Ok(writer)
    }

    /// Create an IndexReader with OnCommit reload policy
    pub fn reader(&self) -> Result<IndexReader, SearchError> {
        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()?;
        debug!("Created index reader");
        Ok(reader)
    }

    /// Get the index path
    pub fn path(&self) -> PathBuf {
        self.config.index_path()
    }
}

fn index_exists_at(path: &Path) -> bool {
    path.join("meta.json").exists()
}
