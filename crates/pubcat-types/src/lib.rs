//! # pubcat-types
//!
//! Shared domain types for the publication catalog.
//!
//! This crate defines the data structures every other crate agrees on:
//! - Publications: the single catalog entity and its partial create form
//! - Adapters: the `RecordStore` and `SearchBackend` seams
//! - Collection helpers: rank/author/date helpers over loaded records
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use pubcat_types::NewPublication;
//!
//! let draft = NewPublication::titled("Sample Publication");
//! let publication = draft.into_publication().unwrap();
//! assert!(!publication.id.is_empty());
//! ```

pub mod adapter;
pub mod collection;
pub mod config;
pub mod error;
pub mod publication;

pub use adapter::{BulkItem, BulkOutcome, BulkResponse, RecordStore, SearchBackend};
pub use collection::{average_rank, by_author, since};
pub use config::{ReindexPolicy, Settings};
pub use error::CatalogError;
pub use publication::{new_publication_id, sample_publication, NewPublication, Publication};
