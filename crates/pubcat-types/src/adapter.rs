//! Adapter seams for the record store and the search index.
//!
//! Both adapters are thin capability wrappers. They hold no caches and
//! never retry; failures surface as `CatalogError::Storage` or
//! `CatalogError::Search` carrying the engine's message.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::publication::Publication;

/// Durable source of truth for publications.
pub trait RecordStore: Send + Sync {
    /// Store a publication under its id.
    fn put(&self, publication: &Publication) -> Result<(), CatalogError>;

    /// Load every stored publication, ordered by id.
    fn get_all(&self) -> Result<Vec<Publication>, CatalogError>;
}

/// Derived full-text projection of the record store.
pub trait SearchBackend: Send + Sync {
    /// Name of the target index.
    fn index_name(&self) -> &str;

    /// Whether the target index exists.
    fn exists(&self) -> Result<bool, CatalogError>;

    /// Create the target index with the fixed field mapping.
    fn create(&self) -> Result<(), CatalogError>;

    /// Write one publication under its id and make it durable.
    fn index(&self, publication: &Publication) -> Result<(), CatalogError>;

    /// Write many publications in one request.
    ///
    /// An `Err` means the whole request failed; per-document failures are
    /// reported in the returned items instead.
    fn bulk(&self, publications: &[Publication]) -> Result<BulkResponse, CatalogError>;

    /// Make written documents visible to searches.
    fn refresh(&self) -> Result<(), CatalogError>;

    /// Number of searchable documents.
    fn count(&self) -> Result<u64, CatalogError>;

    /// Multi-field match over title and text.
    ///
    /// An empty query matches everything. Results are in ranking order and
    /// capped at `limit`.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Publication>, CatalogError>;
}

/// Result of writing one document in a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOutcome {
    /// No document with this id was visible before the write
    Created,
    /// An existing document with this id was replaced
    Updated,
    /// The document was rejected
    Failed(String),
}

/// Per-document result of a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItem {
    pub id: String,
    pub outcome: BulkOutcome,
}

impl BulkItem {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: BulkOutcome::Created,
        }
    }

    pub fn updated(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: BulkOutcome::Updated,
        }
    }

    pub fn failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: BulkOutcome::Failed(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, BulkOutcome::Failed(_))
    }
}

/// Response to a bulk request, one item per submitted document in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    pub fn new(items: Vec<BulkItem>) -> Self {
        Self { items }
    }

    pub fn created(&self) -> usize {
        self.count_where(|o| matches!(o, BulkOutcome::Created))
    }

    pub fn updated(&self) -> usize {
        self.count_where(|o| matches!(o, BulkOutcome::Updated))
    }

    pub fn failed(&self) -> usize {
        self.count_where(|o| matches!(o, BulkOutcome::Failed(_)))
    }

    /// Whether any item failed.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(BulkItem::is_failed)
    }

    /// Failure reasons paired with the document id.
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.items
            .iter()
            .filter_map(|item| match &item.outcome {
                BulkOutcome::Failed(reason) => Some((item.id.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    fn count_where(&self, pred: impl Fn(&BulkOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}
