//! QuizVault main struct and lifecycle operations.
//!
//! The [`QuizVault`] struct is the primary interface for interacting with
//! stored quiz data. It provides methods for:
//!
//! - Opening and closing the vault
//! - Deduplicated record storage, scoped per collection
//! - Managing collections and the active-collection pointer
//! - Plain-text and legacy JSON export
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quizvault::{QuizVault, Config, Record};
//!
//! // Open or create a vault
//! let vault = QuizVault::open("./quiz.db", Config::default())?;
//!
//! // Create a collection and make it active
//! vault.create_collection("aws-saa")?;
//! vault.set_active_collection("aws-saa")?;
//!
//! // Capture a record; a second capture of the same question is a no-op
//! let active = vault.active_collection()?;
//! let capture = vault.capture(&active, &Record::new("Q1\nA. x\nB. y", "A"))?;
//! assert!(capture.inserted);
//!
//! // Close when done
//! vault.close()?;
//! ```
//!
//! # Thread Safety
//!
//! `QuizVault` is `Send + Sync` and can be shared across threads using `Arc`.
//! Each operation is a single storage transaction; operations that read the
//! registry and then write it are not serialized against each other.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::collection::{normalize_collection_name, ActivePointer, RegistryState};
use crate::config::Config;
use crate::error::{ProtectedResourceError, Result, VaultError};
use crate::export::{render_text, write_text};
use crate::extract::DiscussionLink;
use crate::record::{Capture, Record};
use crate::storage::{
    open_storage, DatabaseMetadata, ImportSummary, LegacyDump, MemoryStorage, StorageEngine,
};
use crate::types::Fingerprint;

/// The main QuizVault handle.
///
/// Create an instance with [`QuizVault::open()`] (on disk) or
/// [`QuizVault::in_memory()`], and close it with [`QuizVault::close()`].
///
/// # Ownership
///
/// `QuizVault` owns its storage. When you call `close()`, the vault is
/// consumed and cannot be used afterward.
pub struct QuizVault {
    /// Storage engine (redb or memory).
    storage: Box<dyn StorageEngine>,

    /// Configuration used to open this vault.
    config: Config,
}

impl std::fmt::Debug for QuizVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizVault")
            .field("config", &self.config)
            .field("path", &self.storage.path())
            .finish_non_exhaustive()
    }
}

impl QuizVault {
    /// Opens or creates a vault at the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration is invalid (see [`Config::validate`])
    /// - Database file is corrupted
    /// - Database is locked by another process
    /// - Schema version doesn't match
    /// - The default collection differs from the one the file was created with
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use quizvault::{QuizVault, Config};
    ///
    /// let vault = QuizVault::open("./quiz.db", Config::default())?;
    ///
    /// let vault = QuizVault::open("./quiz.db", Config {
    ///     auto_advance: true,
    ///     ..Default::default()
    /// })?;
    /// ```
    #[instrument(skip(config), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        config.validate().map_err(VaultError::from)?;

        info!("Opening QuizVault");

        let storage = open_storage(&path, &config)?;

        info!(
            default_collection = %config.default_collection,
            sync_mode = ?config.sync_mode,
            "QuizVault opened successfully"
        );

        Ok(Self { storage, config })
    }

    /// Creates a vault that lives only in process memory.
    pub fn in_memory(config: Config) -> Result<Self> {
        config.validate().map_err(VaultError::from)?;

        let storage = Box::new(MemoryStorage::new(&config));
        debug!("In-memory QuizVault created");

        Ok(Self { storage, config })
    }

    /// Closes the vault, flushing all pending writes.
    ///
    /// This method consumes the `QuizVault` instance.
    #[instrument(skip(self))]
    pub fn close(self) -> Result<()> {
        info!("Closing QuizVault");

        self.storage.close()?;

        info!("QuizVault closed successfully");
        Ok(())
    }

    /// Returns the configuration used to open this vault.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the database metadata.
    #[inline]
    pub fn metadata(&self) -> &DatabaseMetadata {
        self.storage.metadata()
    }

    /// Returns the reserved default collection name.
    #[inline]
    pub fn default_collection(&self) -> &str {
        &self.config.default_collection
    }

    /// Returns a reference to the storage engine.
    #[inline]
    #[allow(dead_code)]
    pub(crate) fn storage(&self) -> &dyn StorageEngine {
        self.storage.as_ref()
    }

    // =========================================================================
    // Dedup Store
    // =========================================================================

    /// Returns true if `collection` already holds `fingerprint`.
    pub fn contains(&self, collection: &str, fingerprint: &Fingerprint) -> Result<bool> {
        self.storage.record_exists(collection, fingerprint)
    }

    /// Stores `record` under `fingerprint` unless it is already present.
    ///
    /// Returns `false` (and writes nothing) when the fingerprint exists; the
    /// stored record is never replaced.
    #[instrument(skip(self, record))]
    pub fn insert_if_absent(
        &self,
        collection: &str,
        fingerprint: &Fingerprint,
        record: &Record,
    ) -> Result<bool> {
        self.storage
            .insert_record_if_absent(collection, fingerprint, record)
    }

    /// Fingerprints `record` and stores it if absent.
    pub fn capture(&self, collection: &str, record: &Record) -> Result<Capture> {
        let fingerprint = record.fingerprint();
        let inserted = self.insert_if_absent(collection, &fingerprint, record)?;

        debug!(
            collection = %collection,
            fingerprint = %fingerprint,
            inserted,
            "Record captured"
        );
        Ok(Capture {
            fingerprint,
            inserted,
        })
    }

    /// Returns the record stored under `fingerprint`, if any.
    pub fn get_record(&self, collection: &str, fingerprint: &Fingerprint) -> Result<Option<Record>> {
        self.storage.get_record(collection, fingerprint)
    }

    /// Returns every record of `collection`, keyed by fingerprint.
    ///
    /// A collection that was never written reads as empty.
    pub fn records(&self, collection: &str) -> Result<BTreeMap<Fingerprint, Record>> {
        self.storage.list_records(collection)
    }

    /// Counts the records of `collection`.
    pub fn count(&self, collection: &str) -> Result<u64> {
        self.storage.count_records(collection)
    }

    /// Drops all records of `collection`, leaving the registry untouched.
    ///
    /// Returns the number of records removed; 0 if there were none.
    #[instrument(skip(self))]
    pub fn delete_collection_records(&self, collection: &str) -> Result<u64> {
        self.storage.delete_records(collection)
    }

    // =========================================================================
    // Collection Registry
    // =========================================================================

    /// Lists known collection names in creation order.
    ///
    /// The default collection is always included, even on first run.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        let state = self.storage.load_registry()?;
        Ok(state.names(self.default_collection()))
    }

    /// Registers a new collection.
    ///
    /// The name is trimmed. Returns `false` for a blank or already known
    /// name.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name exceeds
    /// [`MAX_COLLECTION_NAME_LENGTH`](crate::collection::MAX_COLLECTION_NAME_LENGTH)
    /// bytes.
    #[instrument(skip(self))]
    pub fn create_collection(&self, name: &str) -> Result<bool> {
        let Some(name) = normalize_collection_name(name)? else {
            return Ok(false);
        };

        let mut state = self.storage.load_registry()?;
        if !state.add(name, self.default_collection()) {
            return Ok(false);
        }
        self.storage.save_registry(&state)?;

        info!(collection = %name, "Collection created");
        Ok(true)
    }

    /// Persists the active-collection pointer.
    ///
    /// The name is stored as given, without checking that it exists.
    /// Selecting a name that was deleted earlier binds to it again.
    #[instrument(skip(self))]
    pub fn set_active_collection(&self, name: &str) -> Result<()> {
        let mut state = self.storage.load_registry()?;
        state.set_active(name);
        self.storage.save_registry(&state)
    }

    /// Returns the active collection name.
    ///
    /// Reads as the default when the pointer is unset or was left on a
    /// deleted collection.
    pub fn active_collection(&self) -> Result<String> {
        let state = self.storage.load_registry()?;
        Ok(state.active(self.default_collection()))
    }

    /// Returns the state of the active-collection pointer.
    pub fn active_pointer(&self) -> Result<ActivePointer> {
        let state = self.storage.load_registry()?;
        Ok(state.pointer(self.default_collection()))
    }

    /// Deletes a collection and all of its records.
    ///
    /// The registry update and the record removal commit together. An
    /// active pointer left on the deleted name is kept and reads as the
    /// default from then on. A name that is neither registered nor active
    /// only loses its records. Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectedResourceError::DefaultCollection`] for the
    /// default collection.
    #[instrument(skip(self))]
    pub fn delete_collection(&self, name: &str) -> Result<u64> {
        let default = self.default_collection();
        let name = name.trim();
        if name == default {
            return Err(ProtectedResourceError::DefaultCollection(name.to_string()).into());
        }
        if name.is_empty() {
            return Ok(0);
        }

        let mut state = self.storage.load_registry()?;
        let deleted = if state.contains(name, default) || state.is_active(name) {
            state.remove(name, default);
            self.storage.remove_collection(&state, name)?
        } else {
            self.storage.delete_records(name)?
        };

        info!(collection = %name, deleted, "Collection deleted");
        Ok(deleted)
    }

    /// Returns the raw registry state.
    pub fn registry(&self) -> Result<RegistryState> {
        self.storage.load_registry()
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Renders `collection` as export text in the configured order.
    pub fn export_text(&self, collection: &str) -> Result<String> {
        let records = self.records(collection)?;
        Ok(render_text(&records, self.config.export_order))
    }

    /// Writes `collection` to `<dir>/<collection>.txt`.
    ///
    /// Returns `None` without creating a file when the collection is empty.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub fn export_to(&self, collection: &str, dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let records = self.records(collection)?;
        if records.is_empty() {
            debug!("Nothing to export");
            return Ok(None);
        }

        let text = render_text(&records, self.config.export_order);
        let path = write_text(dir.as_ref(), collection, &text)?;

        info!(records = records.len(), path = %path.display(), "Collection exported");
        Ok(Some(path))
    }

    // =========================================================================
    // Discussion Links
    // =========================================================================

    /// Returns the last synced discussion links.
    pub fn discussion_links(&self) -> Result<Vec<DiscussionLink>> {
        self.storage.load_discussion_links()
    }

    /// Replaces the stored discussion links.
    pub fn save_discussion_links(&self, links: &[DiscussionLink]) -> Result<()> {
        self.storage.save_discussion_links(links)
    }

    // =========================================================================
    // Legacy Dump
    // =========================================================================

    /// Imports a browser storage dump.
    ///
    /// The dump is fully validated before anything is written, then the
    /// registry and all records commit in one transaction. Listed names
    /// are added to the registry, records are inserted if absent, and the
    /// dump's active pointer (if any) replaces the current one.
    #[instrument(skip(self, json))]
    pub fn import_legacy_json(&self, json: &str) -> Result<ImportSummary> {
        let default = self.default_collection();
        let dump = LegacyDump::parse(json, default)?;

        let mut state = self.storage.load_registry()?;
        for name in dump.names.iter().flatten().chain(dump.collections.keys()) {
            state.add(name, default);
        }
        if let Some(active) = &dump.active {
            state.set_active(active);
        }
        let records_inserted = self.storage.import_collections(&state, &dump.collections)?;

        info!(
            collections = dump.collections.len(),
            records_inserted,
            skipped = dump.skipped_keys.len(),
            "Legacy dump imported"
        );

        Ok(ImportSummary {
            collections: dump.collections.len(),
            records_inserted,
            skipped_keys: dump.skipped_keys,
        })
    }

    /// Exports the registry and every known collection as a browser
    /// storage dump.
    pub fn export_legacy_json(&self) -> Result<String> {
        let default = self.default_collection();
        let state = self.storage.load_registry()?;

        let mut collections = BTreeMap::new();
        for name in state.names(default) {
            let records = self.storage.list_records(&name)?;
            if !records.is_empty() {
                collections.insert(name, records);
            }
        }

        LegacyDump::from_parts(&state, default, collections).to_json()
    }
}

// QuizVault is auto Send + Sync: Box<dyn StorageEngine> (StorageEngine:
// Send + Sync) and Config are both Send + Sync.
