//! RocksDB wrapper for the publication record store.
//!
//! Provides:
//! - Database open/close with column family setup
//! - Single-record writes and reads by id
//! - Full scans in id order
//! - Admin operations (flush, compact, stats)

use rocksdb::{Direction, IteratorMode, Options, DB};
use std::path::Path;
use tracing::{debug, info};

use pubcat_types::{CatalogError, Publication, RecordStore};

use crate::column_families::{build_cf_descriptors, ALL_CF_NAMES, CF_PUBLICATIONS};
use crate::error::StorageError;
use crate::keys::PublicationKey;

/// Main storage interface for the record store
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(4);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    /// Store a publication, replacing any record with the same id.
    pub fn put_publication(&self, publication: &Publication) -> Result<(), StorageError> {
        let cf = self
            .db
            .cf_handle(CF_PUBLICATIONS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_PUBLICATIONS.to_string()))?;

        let key = PublicationKey::new(publication.id.as_str())?;
        let bytes = publication.to_bytes()?;
        self.db.put_cf(&cf, key.to_bytes(), bytes)?;
        debug!(id = %publication.id, "Stored publication");
        Ok(())
    }

    /// Get a publication by id
    pub fn get_publication(&self, id: &str) -> Result<Option<Publication>, StorageError> {
        let cf = self
            .db
            .cf_handle(CF_PUBLICATIONS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_PUBLICATIONS.to_string()))?;

        let key = PublicationKey::new(id)?;
        match self.db.get_cf(&cf, key.to_bytes())? {
            Some(bytes) => Ok(Some(Publication::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load every stored publication in key order.
    pub fn get_all_publications(&self) -> Result<Vec<Publication>, StorageError> {
        let cf = self
            .db
            .cf_handle(CF_PUBLICATIONS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_PUBLICATIONS.to_string()))?;

        let prefix = PublicationKey::prefix();
        let mut results = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push(Publication::from_bytes(&value)?);
        }

        Ok(results)
    }

    /// Number of stored publications
    pub fn count_publications(&self) -> Result<u64, StorageError> {
        let cf = self
            .db
            .cf_handle(CF_PUBLICATIONS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_PUBLICATIONS.to_string()))?;
        self.count_cf_entries(cf)
    }

    /// Flush all column families to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.flush_cf(&cf)?;
            }
        }
        Ok(())
    }

    // ===== Admin Operations =====

    /// Trigger manual compaction on all column families.
    pub fn compact(&self) -> Result<(), StorageError> {
        info!("Starting full compaction...");
        self.db.compact_range::<&[u8], &[u8]>(None, None);

        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.compact_range_cf::<&[u8], &[u8]>(&cf, None, None);
            }
        }
        info!("Compaction complete");
        Ok(())
    }

    /// Get database statistics.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let mut stats = StorageStats::default();

        if let Some(cf) = self.db.cf_handle(CF_PUBLICATIONS) {
            stats.publication_count = self.count_cf_entries(cf)?;
        }

        stats.disk_usage_bytes = self.get_disk_usage()?;

        Ok(stats)
    }

    fn count_cf_entries(&self, cf: &rocksdb::ColumnFamily) -> Result<u64, StorageError> {
        let mut count = 0u64;
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);
        for item in iter {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn get_disk_usage(&self) -> Result<u64, StorageError> {
        let path = self.db.path();
        let mut total_size = 0u64;

        if let Ok(entries) = std::fs::read_dir(path) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }

        Ok(total_size)
    }
}

impl RecordStore for Storage {
    fn put(&self, publication: &Publication) -> Result<(), CatalogError> {
        Ok(self.put_publication(publication)?)
    }

    fn get_all(&self) -> Result<Vec<Publication>, CatalogError> {
        Ok(self.get_all_publications()?)
    }
}

/// Statistics about the storage.
#[derive(Debug, Default)]
pub struct StorageStats {
    /// Number of publications stored
    pub publication_count: u64,
    /// Approximate size of the database directory
    pub disk_usage_bytes: u64,
}
