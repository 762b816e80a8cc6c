//! Volatile in-process snapshot backend.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::StorageError;
use crate::snapshot::SnapshotStore;

/// Snapshot backend holding serialized records in memory.
///
/// Records are stored as JSON so a load always returns fresh copies, the
/// same way a durable backend would.
pub struct MemorySnapshotStore<R> {
    records: Mutex<Vec<Vec<u8>>>,
    writes: AtomicUsize,
    _record: PhantomData<fn() -> R>,
}

impl<R> MemorySnapshotStore<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            writes: AtomicUsize::new(0),
            _record: PhantomData,
        }
    }

    /// Number of successful `replace_all` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of records in the current snapshot.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Serialize> MemorySnapshotStore<R> {
    /// Create a backend pre-seeded with `records`.
    pub fn with_records(records: &[R]) -> Result<Self, StorageError> {
        let store = Self::new();
        {
            let mut guard = store
                .records
                .lock()
                .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;
            for record in records {
                guard.push(serde_json::to_vec(record)?);
            }
        }
        Ok(store)
    }
}

impl<R> Default for MemorySnapshotStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> SnapshotStore<R> for MemorySnapshotStore<R>
where
    R: Serialize + DeserializeOwned,
{
    fn name(&self) -> &str {
        "memory"
    }

    fn load_all(&self) -> Result<Vec<R>, StorageError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;

        records
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).map_err(StorageError::from))
            .collect()
    }

    fn replace_all(&self, records: &[R]) -> Result<(), StorageError> {
        let encoded = records
            .iter()
            .map(serde_json::to_vec)
            .collect::<Result<Vec<_>, _>>()?;

        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;
        *guard = encoded;
        self.writes.fetch_add(1, Ordering::SeqCst);

        debug!(written = records.len(), "Replaced in-memory snapshot");
        Ok(())
    }
}
