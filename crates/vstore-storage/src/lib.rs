//! Snapshot persistence for vector-storage.
//!
//! Provides the replace-all backend contract used by the index plus two
//! implementations:
//! - RocksDB-backed snapshots written as one atomic `WriteBatch`
//! - A volatile in-memory backend for tests and ephemeral stores

pub mod error;
pub mod memory;
pub mod rocks;
pub mod snapshot;

pub use error::StorageError;
pub use memory::MemorySnapshotStore;
pub use rocks::{RocksSnapshotStore, CF_DOCUMENTS};
pub use snapshot::SnapshotStore;
