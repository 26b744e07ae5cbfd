//! Record store for the publication catalog.
//!
//! Provides RocksDB-backed storage with:
//! - A dedicated column family for publication records
//! - Id-prefixed keys so a full scan returns records in id order
//! - JSON-encoded values matching the HTTP representation
//! - A `RecordStore` implementation for the adapter seam

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use keys::PublicationKey;
