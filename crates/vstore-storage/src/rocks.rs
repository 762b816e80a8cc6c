//! RocksDB snapshot backend.
//!
//! Records live in one column family, keyed by their big-endian position in
//! the snapshot so a forward scan returns them in collection order. A
//! replace is a single `WriteBatch`: deletes for every existing key plus puts
//! for the new records.

use std::path::Path;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::snapshot::SnapshotStore;

/// Column family name for snapshot records
pub const CF_DOCUMENTS: &str = "documents";

/// Snapshot storage using RocksDB.
pub struct RocksSnapshotStore {
    db: DB,
}

impl RocksSnapshotStore {
    /// Open or create snapshot storage at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        let cf = ColumnFamilyDescriptor::new(CF_DOCUMENTS, cf_opts);

        let db = DB::open_cf_descriptors(&opts, path, vec![cf])?;

        info!(path = ?path, "Opened snapshot storage");
        Ok(Self { db })
    }

    /// Get the column family handle
    fn cf(&self) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_DOCUMENTS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_DOCUMENTS.to_string()))
    }

    /// Count stored records
    pub fn count(&self) -> Result<usize, StorageError> {
        let mut count = 0;
        for item in self.db.iterator_cf(self.cf()?, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }
}

fn position_key(position: usize) -> [u8; 8] {
    (position as u64).to_be_bytes()
}

impl<R> SnapshotStore<R> for RocksSnapshotStore
where
    R: Serialize + DeserializeOwned,
{
    fn name(&self) -> &str {
        "rocksdb"
    }

    fn load_all(&self) -> Result<Vec<R>, StorageError> {
        let cf = self.cf()?;
        let mut records = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            if key.len() != 8 {
                return Err(StorageError::Key(format!(
                    "expected 8-byte position key, got {} bytes",
                    key.len()
                )));
            }
            records.push(serde_json::from_slice(&value)?);
        }

        debug!(count = records.len(), "Loaded snapshot");
        Ok(records)
    }

    fn replace_all(&self, records: &[R]) -> Result<(), StorageError> {
        let cf = self.cf()?;

        // Collect existing keys first to avoid iterator invalidation
        let existing: Vec<Box<[u8]>> = self
            .db
            .iterator_cf(cf, IteratorMode::Start)
            .map(|item| item.map(|(k, _)| k))
            .collect::<Result<_, _>>()?;

        let mut batch = WriteBatch::default();
        for key in &existing {
            batch.delete_cf(cf, key);
        }
        for (position, record) in records.iter().enumerate() {
            let value = serde_json::to_vec(record)?;
            batch.put_cf(cf, position_key(position), value);
        }

        self.db.write(batch)?;
        debug!(
            removed = existing.len(),
            written = records.len(),
            "Replaced snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use vstore_types::Document;

    type Doc = Document<serde_json::Value>;

    fn doc(text: &str, hits: u64) -> Doc {
        Document::with_embedding(text, json!({"source": text}), vec![1.0, 2.0], 1_000)
            .with_hits(hits)
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let temp = TempDir::new().unwrap();
        let store = RocksSnapshotStore::open(temp.path()).unwrap();
        let loaded: Vec<Doc> = store.load_all().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_replace_and_load_preserves_order() {
        let temp = TempDir::new().unwrap();
        let store = RocksSnapshotStore::open(temp.path()).unwrap();

        let docs = vec![doc("b", 0), doc("a", 2), doc("c", 1)];
        store.replace_all(&docs).unwrap();

        let loaded: Vec<Doc> = store.load_all().unwrap();
        assert_eq!(loaded, docs);
    }

    #[test]
    fn test_replace_shrinks_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = RocksSnapshotStore::open(temp.path()).unwrap();

        store
            .replace_all(&[doc("a", 0), doc("b", 0), doc("c", 0)])
            .unwrap();
        store.replace_all(&[doc("z", 4)]).unwrap();

        let loaded: Vec<Doc> = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "z");
        assert_eq!(loaded[0].hits, 4);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_replace_with_empty_clears() {
        let temp = TempDir::new().unwrap();
        let store = RocksSnapshotStore::open(temp.path()).unwrap();

        store.replace_all(&[doc("a", 0)]).unwrap();
        store.replace_all(&Vec::<Doc>::new()).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = RocksSnapshotStore::open(temp.path()).unwrap();
            store.replace_all(&[doc("persisted", 7)]).unwrap();
        }

        let store = RocksSnapshotStore::open(temp.path()).unwrap();
        let loaded: Vec<Doc> = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "persisted");
        assert_eq!(
            loaded[0].vector_mag,
            Some(vstore_types::magnitude(&[1.0, 2.0]))
        );
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = RocksSnapshotStore::open(temp.path()).unwrap();
        let cf = store.cf().unwrap();
        store.db.put_cf(cf, position_key(0), b"not json").unwrap();

        let result: Result<Vec<Doc>, _> = store.load_all();
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
