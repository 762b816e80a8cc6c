//! Snapshot persistence contract.
//!
//! The index persists its whole collection at once: hydrate everything on
//! open, replace everything after each mutation. Partial updates are never
//! written, so a reader never observes a half-written snapshot.

use crate::error::StorageError;

/// Replace-all persistence backend for records of type `R`.
pub trait SnapshotStore<R>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Load every record of the last snapshot, in snapshot order.
    fn load_all(&self) -> Result<Vec<R>, StorageError>;

    /// Atomically clear the backend and write `records` as the new snapshot.
    fn replace_all(&self, records: &[R]) -> Result<(), StorageError>;
}

/// Shared handles delegate to the backend, so callers can keep one for inspection.
impl<R, S> SnapshotStore<R> for std::sync::Arc<S>
where
    S: SnapshotStore<R> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_all(&self) -> Result<Vec<R>, StorageError> {
        (**self).load_all()
    }

    fn replace_all(&self, records: &[R]) -> Result<(), StorageError> {
        (**self).replace_all(records)
    }
}
