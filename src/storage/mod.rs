//! Storage layer abstractions for QuizVault.
//!
//! This module provides a trait-based abstraction over the key/value store,
//! allowing different backends to be used (redb on disk, memory for tests
//! and throwaway sessions).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      QuizVault                              │
//! │                         │                                   │
//! │                         ▼                                   │
//! │              ┌─────────────────────┐                        │
//! │              │   StorageEngine     │  ← Trait               │
//! │              └─────────────────────┘                        │
//! │                    ▲         ▲                              │
//! │                    │         │                              │
//! │         ┌─────────┴─┐   ┌───┴───────────┐                   │
//! │         │RedbStorage│   │ MemoryStorage │                   │
//! │         └───────────┘   └───────────────┘                   │
//! │           (disk)           (in-process)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Consistency
//!
//! Every method is one transaction: a write is visible to the next read as
//! soon as the method returns. Nothing spans two calls, so a `contains`
//! followed by an insert from another caller can interleave; the insert
//! itself still never overwrites.

pub mod legacy;
pub mod memory;
pub mod redb;
pub mod schema;

pub use self::legacy::{ImportSummary, LegacyDump};
pub use self::memory::MemoryStorage;
pub use self::redb::RedbStorage;
pub use schema::{DatabaseMetadata, SCHEMA_VERSION};

use std::collections::BTreeMap;
use std::path::Path;

use crate::collection::RegistryState;
use crate::config::Config;
use crate::error::Result;
use crate::extract::DiscussionLink;
use crate::record::Record;
use crate::types::Fingerprint;

/// Storage engine trait for QuizVault.
///
/// This trait defines the contract that any storage backend must implement.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow the vault to be shared
/// across threads. The engine handles internal synchronization.
pub trait StorageEngine: Send + Sync {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Returns the database metadata.
    fn metadata(&self) -> &DatabaseMetadata;

    /// Closes the storage engine, flushing any pending writes.
    ///
    /// This method consumes the storage engine.
    fn close(self: Box<Self>) -> Result<()>;

    /// Returns the path to the database file, if applicable.
    fn path(&self) -> Option<&Path>;

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Returns true if `collection` holds a record under `fingerprint`.
    fn record_exists(&self, collection: &str, fingerprint: &Fingerprint) -> Result<bool>;

    /// Retrieves the record stored under `fingerprint`, if any.
    fn get_record(&self, collection: &str, fingerprint: &Fingerprint) -> Result<Option<Record>>;

    /// Stores `record` unless `fingerprint` is already present.
    ///
    /// The existence check and the write happen in one transaction.
    /// Returns `true` if the record was written.
    fn insert_record_if_absent(
        &self,
        collection: &str,
        fingerprint: &Fingerprint,
        record: &Record,
    ) -> Result<bool>;


    /// Returns every record of `collection`; empty if it has none.
    fn list_records(&self, collection: &str) -> Result<BTreeMap<Fingerprint, Record>>;

    /// Counts records in `collection`; 0 if it has none.
    fn count_records(&self, collection: &str) -> Result<u64>;

    /// Drops every record of `collection`.
    ///
    /// Returns the number of records deleted (0 when there was nothing).
    fn delete_records(&self, collection: &str) -> Result<u64>;

    // =========================================================================
    // Registry Operations
    // =========================================================================

    /// Loads the stored registry state.
    fn load_registry(&self) -> Result<RegistryState>;

    /// Persists the registry state.
    fn save_registry(&self, state: &RegistryState) -> Result<()>;

    /// Persists `state` and stores every absent record of `collections`
    /// in one transaction.
    ///
    /// Nothing is written if any part fails. Returns the number of records
    /// written.
    fn import_collections(
        &self,
        state: &RegistryState,
        collections: &BTreeMap<String, BTreeMap<Fingerprint, Record>>,
    ) -> Result<u64>;

    /// Persists `state` and drops `collection`'s records in one transaction.
    ///
    /// Returns the number of records deleted.
    fn remove_collection(&self, state: &RegistryState, collection: &str) -> Result<u64>;

    // =========================================================================
    // Discussion Links
    // =========================================================================

    /// Loads the last synced discussion links.
    fn load_discussion_links(&self) -> Result<Vec<DiscussionLink>>;

    /// Replaces the stored discussion links.
    fn save_discussion_links(&self, links: &[DiscussionLink]) -> Result<()>;
}

/// Opens a storage engine at the given path.
///
/// This is a convenience function that creates a [`RedbStorage`] instance.
///
/// # Errors
///
/// Returns an error if:
/// - The database file is corrupted
/// - The database is locked by another process
/// - Schema version doesn't match
/// - The default collection doesn't match (for existing databases)
pub fn open_storage(path: impl AsRef<Path>, config: &Config) -> Result<Box<dyn StorageEngine>> {
    let storage = RedbStorage::open(path, config)?;
    Ok(Box::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_storage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let config = Config::default();
        let storage = open_storage(&path, &config).unwrap();

        assert_eq!(storage.metadata().default_collection, "quizletData");
        assert!(storage.path().is_some());

        storage.close().unwrap();
    }

    #[test]
    fn test_storage_engines_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RedbStorage>();
        assert_send_sync::<MemoryStorage>();
    }
}
