//! # pubcat-search
//!
//! Full-text search over publications using Tantivy.
//!
//! The search index is a derived projection of the record store: every
//! document carries the record id as its key, and the whole index can be
//! rebuilt from the store at any time.
//!
//! ## Features
//! - Embedded Tantivy index per index name, persisted with MmapDirectory
//! - BM25 ranking over title and text, OR semantics across terms
//! - Upsert by id, so repeated writes never duplicate a record
//! - `TantivyBackend` implementing the `SearchBackend` adapter seam

pub mod backend;
pub mod document;
pub mod error;
pub mod index;
pub mod indexer;
pub mod schema;
pub mod searcher;

pub use backend::TantivyBackend;
pub use document::{doc_to_publication, publication_to_doc};
pub use error::SearchError;
pub use index::{SearchIndex, SearchIndexConfig};
pub use indexer::SearchIndexer;
pub use schema::{build_publication_schema, PublicationSchema};
pub use searcher::PublicationSearcher;
