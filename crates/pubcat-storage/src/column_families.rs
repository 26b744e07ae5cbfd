//! Column family definitions for RocksDB.
//!
//! - publications: catalog records keyed by id (Zstd compressed)

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for publication records
pub const CF_PUBLICATIONS: &str = "publications";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_PUBLICATIONS];

fn publications_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![ColumnFamilyDescriptor::new(
        CF_PUBLICATIONS,
        publications_options(),
    )]
}
