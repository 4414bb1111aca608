//! redb storage engine implementation.
//!
//! This module provides the on-disk storage backend for QuizVault using
//! [redb](https://docs.rs/redb), a pure Rust embedded key-value store.
//!
//! # Features
//!
//! - ACID transactions with MVCC
//! - Single-writer, multiple-reader concurrency
//! - Automatic crash recovery
//!
//! # File Layout
//!
//! When you open a vault at `./quiz.db`, redb creates:
//! - `./quiz.db` - Main database file
//! - `./quiz.db.lock` - Lock file for writer coordination (may not be visible)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ::redb::{
    Database, Durability, ReadOnlyTable, ReadTransaction, ReadableTable, ReadableTableMetadata,
    TableError, WriteTransaction,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::schema::{
    records_table, records_table_name, DatabaseMetadata, DB_METADATA_KEY, DELETED_KEYS_KEY,
    DISCUSSION_LINKS_KEY, LAST_SELECTED_KEY, METADATA_TABLE, SCHEMA_VERSION,
    STORAGE_KEYS_LIST_KEY,
};
use super::StorageEngine;
use crate::collection::RegistryState;
use crate::config::{Config, SyncMode};
use crate::error::{Result, StorageError, VaultError};
use crate::extract::DiscussionLink;
use crate::record::Record;
use crate::types::Fingerprint;

/// redb storage engine wrapper.
///
/// This struct holds the redb database handle and cached metadata.
/// It implements [`StorageEngine`] for use with QuizVault.
///
/// # Thread Safety
///
/// `RedbStorage` is `Send + Sync`. redb handles internal synchronization
/// using MVCC for readers and exclusive locking for writers.
#[derive(Debug)]
pub struct RedbStorage {
    /// The redb database handle.
    db: Database,

    /// Cached database metadata.
    metadata: DatabaseMetadata,

    /// Path to the database file.
    path: PathBuf,

    /// Durability applied to every write transaction.
    sync_mode: SyncMode,
}

impl RedbStorage {
    /// Opens or creates a database at the given path.
    ///
    /// If the database doesn't exist, it will be created and initialized
    /// with the configuration settings. If it exists, the configuration
    /// will be validated against the stored metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database file is corrupted
    /// - The database is locked by another process
    /// - Schema version doesn't match
    /// - The default collection doesn't match (for existing databases)
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use quizvault::{Config, storage::RedbStorage};
    ///
    /// let storage = RedbStorage::open("./quiz.db", &Config::default())?;
    /// ```
    #[instrument(skip(config), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let db_exists = path.exists();

        debug!(db_exists = db_exists, "Opening storage engine");

        let db = Self::create_database(path)?;

        if db_exists {
            Self::open_existing(db, path.to_path_buf(), config)
        } else {
            Self::initialize_new(db, path.to_path_buf(), config)
        }
    }

    /// Creates the redb database file handle.
    fn create_database(path: &Path) -> Result<Database> {
        // redb doesn't expose a typed error variant for lock conflicts,
        // so they are detected via the error message.
        let db = Database::builder().create(path).map_err(|e| {
            if e.to_string().contains("locked") {
                StorageError::DatabaseLocked
            } else {
                StorageError::Redb(e.to_string())
            }
        })?;

        debug!("Database file opened successfully");
        Ok(db)
    }

    /// Initializes a new database with the metadata table.
    #[instrument(skip(db, config), fields(path = %path.display()))]
    fn initialize_new(db: Database, path: PathBuf, config: &Config) -> Result<Self> {
        info!("Initializing new database");

        let metadata = DatabaseMetadata::new(config.default_collection.as_str());

        let write_txn = db.begin_write().map_err(StorageError::from)?;
        {
            let mut meta_table = write_txn.open_table(METADATA_TABLE)?;
            let metadata_bytes = bincode::serialize(&metadata)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            meta_table.insert(DB_METADATA_KEY, metadata_bytes.as_slice())?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        info!(
            schema_version = SCHEMA_VERSION,
            default_collection = %metadata.default_collection,
            "Database initialized"
        );

        Ok(Self {
            db,
            metadata,
            path,
            sync_mode: config.sync_mode,
        })
    }

    /// Opens and validates an existing database.
    #[instrument(skip(db, config), fields(path = %path.display()))]
    fn open_existing(db: Database, path: PathBuf, config: &Config) -> Result<Self> {
        info!("Opening existing database");

        let read_txn = db.begin_read().map_err(StorageError::from)?;

        let metadata = {
            let meta_table = read_txn.open_table(METADATA_TABLE).map_err(|e| {
                StorageError::corrupted(format!("Cannot open metadata table: {}", e))
            })?;

            let metadata_bytes = meta_table
                .get(DB_METADATA_KEY)
                .map_err(StorageError::from)?
                .ok_or_else(|| StorageError::corrupted("Missing database metadata"))?;

            bincode::deserialize::<DatabaseMetadata>(metadata_bytes.value())
                .map_err(|e| StorageError::corrupted(format!("Invalid metadata format: {}", e)))?
        };

        drop(read_txn);

        if metadata.schema_version != SCHEMA_VERSION {
            warn!(
                expected = SCHEMA_VERSION,
                found = metadata.schema_version,
                "Schema version mismatch"
            );
            return Err(VaultError::Storage(StorageError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: metadata.schema_version,
            }));
        }

        if metadata.default_collection != config.default_collection {
            warn!(
                expected = %config.default_collection,
                found = %metadata.default_collection,
                "Default collection mismatch"
            );
            return Err(VaultError::config(format!(
                "database was created with default collection '{}', not '{}'",
                metadata.default_collection, config.default_collection
            )));
        }

        let mut metadata = metadata;
        metadata.touch();

        let write_txn = db.begin_write().map_err(StorageError::from)?;
        {
            let mut meta_table = write_txn.open_table(METADATA_TABLE)?;
            let metadata_bytes = bincode::serialize(&metadata)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            meta_table.insert(DB_METADATA_KEY, metadata_bytes.as_slice())?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        info!(
            schema_version = metadata.schema_version,
            "Database opened successfully"
        );

        Ok(Self {
            db,
            metadata,
            path,
            sync_mode: config.sync_mode,
        })
    }

    /// Returns a reference to the underlying redb database.
    #[inline]
    #[allow(dead_code)] // Used by the ACID tests
    pub(crate) fn database(&self) -> &Database {
        &self.db
    }

    /// Starts a write transaction with the configured durability.
    fn begin_write(&self) -> Result<WriteTransaction> {
        let mut txn = self.db.begin_write().map_err(StorageError::from)?;
        txn.set_durability(match self.sync_mode {
            SyncMode::Normal => Durability::Immediate,
            SyncMode::Fast => Durability::Eventual,
        });
        Ok(txn)
    }

    /// Reads and decodes one metadata value.
    fn read_meta<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table = read_txn.open_table(METADATA_TABLE)?;
        decode_meta(&table, key)
    }

    /// Writes the registry keys inside an open transaction.
    fn put_registry(txn: &WriteTransaction, state: &RegistryState) -> Result<()> {
        let mut table = txn.open_table(METADATA_TABLE)?;

        match &state.names {
            Some(names) => {
                let bytes = bincode::serialize(names)?;
                table.insert(STORAGE_KEYS_LIST_KEY, bytes.as_slice())?;
            }
            None => {
                table.remove(STORAGE_KEYS_LIST_KEY)?;
            }
        }

        match &state.active {
            Some(active) => {
                let bytes = bincode::serialize(active)?;
                table.insert(LAST_SELECTED_KEY, bytes.as_slice())?;
            }
            None => {
                table.remove(LAST_SELECTED_KEY)?;
            }
        }

        let bytes = bincode::serialize(&state.deleted)?;
        table.insert(DELETED_KEYS_KEY, bytes.as_slice())?;
        Ok(())
    }

    /// Stores the absent entries of `records` inside an open transaction.
    fn put_records_if_absent(
        txn: &WriteTransaction,
        collection: &str,
        records: &BTreeMap<Fingerprint, Record>,
    ) -> Result<u64> {
        let table_name = records_table_name(collection);
        let mut table = txn.open_table(records_table(&table_name))?;

        let mut inserted = 0u64;
        for (fingerprint, record) in records {
            if table.get(fingerprint.as_str())?.is_some() {
                continue;
            }
            let bytes = bincode::serialize(record)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            table.insert(fingerprint.as_str(), bytes.as_slice())?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Drops a record table inside an open transaction, returning its size.
    fn drop_records(txn: &WriteTransaction, table_name: &str) -> Result<u64> {
        let definition = records_table(table_name);
        let count = {
            let table = txn.open_table(definition)?;
            table.len()?
        };
        txn.delete_table(definition)?;
        Ok(count)
    }
}

/// Decodes one metadata value from an open table.
fn decode_meta<T: DeserializeOwned>(
    table: &ReadOnlyTable<&'static str, &'static [u8]>,
    key: &str,
) -> Result<Option<T>> {
    match table.get(key)? {
        Some(value) => {
            let decoded = bincode::deserialize(value.value())
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            Ok(Some(decoded))
        }
        None => Ok(None),
    }
}

/// Opens a collection's record table, or `None` if nothing was ever stored.
fn open_records(
    txn: &ReadTransaction,
    table_name: &str,
) -> Result<Option<ReadOnlyTable<&'static str, &'static [u8]>>> {
    match txn.open_table(records_table(table_name)) {
        Ok(table) => Ok(Some(table)),
        Err(TableError::TableDoesNotExist(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl StorageEngine for RedbStorage {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    #[instrument(skip(self))]
    fn close(self: Box<Self>) -> Result<()> {
        info!("Closing storage engine");

        // redb flushes all data durably on drop, which is infallible.
        drop(self.db);

        info!("Storage engine closed");
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    fn record_exists(&self, collection: &str, fingerprint: &Fingerprint) -> Result<bool> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table_name = records_table_name(collection);
        let Some(table) = open_records(&read_txn, &table_name)? else {
            return Ok(false);
        };

        let exists = table.get(fingerprint.as_str())?.is_some();
        Ok(exists)
    }

    fn get_record(&self, collection: &str, fingerprint: &Fingerprint) -> Result<Option<Record>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table_name = records_table_name(collection);
        let Some(table) = open_records(&read_txn, &table_name)? else {
            return Ok(None);
        };

        match table.get(fingerprint.as_str())? {
            Some(value) => {
                let record: Record = bincode::deserialize(value.value())
                    .map_err(|e| StorageError::serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn insert_record_if_absent(
        &self,
        collection: &str,
        fingerprint: &Fingerprint,
        record: &Record,
    ) -> Result<bool> {
        let bytes =
            bincode::serialize(record).map_err(|e| StorageError::serialization(e.to_string()))?;
        let table_name = records_table_name(collection);

        let write_txn = self.begin_write()?;
        let inserted = {
            let mut table = write_txn.open_table(records_table(&table_name))?;
            let exists = table.get(fingerprint.as_str())?.is_some();
            if !exists {
                table.insert(fingerprint.as_str(), bytes.as_slice())?;
            }
            !exists
        };

        if inserted {
            write_txn.commit().map_err(StorageError::from)?;
            debug!(collection = %collection, fingerprint = %fingerprint, "Record saved");
        } else {
            write_txn.abort().map_err(StorageError::from)?;
        }
        Ok(inserted)
    }

    fn list_records(&self, collection: &str) -> Result<BTreeMap<Fingerprint, Record>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table_name = records_table_name(collection);
        let Some(table) = open_records(&read_txn, &table_name)? else {
            return Ok(BTreeMap::new());
        };

        let mut records = BTreeMap::new();
        for result in table.iter()? {
            let (key, value) = result.map_err(StorageError::from)?;
            let fingerprint = Fingerprint::parse(key.value()).map_err(|e| {
                StorageError::corrupted(format!("Invalid record key in '{}': {}", collection, e))
            })?;
            let record: Record = bincode::deserialize(value.value())
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            records.insert(fingerprint, record);
        }

        Ok(records)
    }

    fn count_records(&self, collection: &str) -> Result<u64> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table_name = records_table_name(collection);
        match open_records(&read_txn, &table_name)? {
            Some(table) => Ok(table.len()?),
            None => Ok(0),
        }
    }

    fn delete_records(&self, collection: &str) -> Result<u64> {
        let table_name = records_table_name(collection);

        let write_txn = self.begin_write()?;
        let deleted = Self::drop_records(&write_txn, &table_name)?;
        write_txn.commit().map_err(StorageError::from)?;

        if deleted > 0 {
            debug!(collection = %collection, deleted, "Records deleted");
        }
        Ok(deleted)
    }

    // =========================================================================
    // Registry Operations
    // =========================================================================

    fn load_registry(&self) -> Result<RegistryState> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table = read_txn.open_table(METADATA_TABLE)?;

        Ok(RegistryState {
            names: decode_meta(&table, STORAGE_KEYS_LIST_KEY)?,
            active: decode_meta(&table, LAST_SELECTED_KEY)?,
            deleted: decode_meta(&table, DELETED_KEYS_KEY)?.unwrap_or_default(),
        })
    }

    fn save_registry(&self, state: &RegistryState) -> Result<()> {
        let write_txn = self.begin_write()?;
        Self::put_registry(&write_txn, state)?;
        write_txn.commit().map_err(StorageError::from)?;

        debug!(active = ?state.active, "Registry saved");
        Ok(())
    }

    fn import_collections(
        &self,
        state: &RegistryState,
        collections: &BTreeMap<String, BTreeMap<Fingerprint, Record>>,
    ) -> Result<u64> {
        let write_txn = self.begin_write()?;
        Self::put_registry(&write_txn, state)?;

        let mut inserted = 0u64;
        for (collection, records) in collections {
            inserted += Self::put_records_if_absent(&write_txn, collection, records)?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        debug!(collections = collections.len(), inserted, "Collections imported");
        Ok(inserted)
    }

    fn remove_collection(&self, state: &RegistryState, collection: &str) -> Result<u64> {
        let table_name = records_table_name(collection);

        let write_txn = self.begin_write()?;
        Self::put_registry(&write_txn, state)?;
        let deleted = Self::drop_records(&write_txn, &table_name)?;
        write_txn.commit().map_err(StorageError::from)?;

        debug!(collection = %collection, deleted, "Collection removed");
        Ok(deleted)
    }

    // =========================================================================
    // Discussion Links
    // =========================================================================

    fn load_discussion_links(&self) -> Result<Vec<DiscussionLink>> {
        Ok(self.read_meta(DISCUSSION_LINKS_KEY)?.unwrap_or_default())
    }

    fn save_discussion_links(&self, links: &[DiscussionLink]) -> Result<()> {
        let bytes = bincode::serialize(links)?;

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(METADATA_TABLE)?;
            table.insert(DISCUSSION_LINKS_KEY, bytes.as_slice())?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        debug!(count = links.len(), "Discussion links saved");
        Ok(())
    }
}

// RedbStorage is auto Send + Sync: Database, DatabaseMetadata, PathBuf and
// SyncMode are all Send + Sync.
