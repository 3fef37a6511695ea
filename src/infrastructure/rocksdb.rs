use crate::domain::ports::CartSlot;
use crate::error::{CartError, Result};
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing serialized carts.
pub const CF_CARTS: &str = "carts";

/// A persistent slot implementation using RocksDB.
///
/// Each key maps to one entry in the `carts` column family.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBSlot {
    db: Arc<DB>,
}

impl RocksDBSlot {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the `carts` column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_carts = ColumnFamilyDescriptor::new(CF_CARTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_carts]).map_err(storage_error)?;

        Ok(Self { db: Arc::new(db) })
    }
}

fn storage_error(e: rocksdb::Error) -> CartError {
    CartError::StorageError(format!("RocksDB error: {}", e))
}

impl CartSlot for RocksDBSlot {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(CF_CARTS)
            .ok_or_else(|| CartError::StorageError("Carts column family not found".to_string()))?;

        self.db.get_cf(&cf, key.as_bytes()).map_err(storage_error)
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_CARTS)
            .ok_or_else(|| CartError::StorageError("Carts column family not found".to_string()))?;

        self.db
            .put_cf(&cf, key.as_bytes(), value)
            .map_err(storage_error)
    }
}
