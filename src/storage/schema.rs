//! Database schema definitions and versioning.
//!
//! This module defines the table structure for the redb storage engine.
//!
//! # Schema Versioning
//!
//! The schema version is stored in the metadata table. When opening an
//! existing database, we check the version and fail if it doesn't match.
//!
//! # Table Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ METADATA_TABLE ("metadata")                                  │
//! │   Key: &str                                                  │
//! │   Value: &[u8] (bincode)                                     │
//! │   "db_metadata"            -> DatabaseMetadata               │
//! │   "storageKeysList"        -> Vec<String>                    │
//! │   "lastSelectedStorageKey" -> String                         │
//! │   "deletedStorageKeys"     -> Vec<String>                    │
//! │   "discussionLinks"        -> Vec<DiscussionLink>            │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │ one table per collection ("records/<name>")                  │
//! │   Key: &str (Fingerprint)                                    │
//! │   Value: &[u8] (bincode-serialized Record)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A collection table is created by its first insert and dropped whole
//! when the collection is deleted. Reading a collection whose table does
//! not exist yields an empty collection.

use redb::TableDefinition;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Current schema version.
///
/// Increment this when making breaking changes to the schema.
/// The database will refuse to open if versions don't match.
pub const SCHEMA_VERSION: u32 = 1;

/// Metadata table for database-level information and registry state.
pub const METADATA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("metadata");

/// Metadata key of [`DatabaseMetadata`].
pub const DB_METADATA_KEY: &str = "db_metadata";

/// Metadata key of the ordered collection name list.
pub const STORAGE_KEYS_LIST_KEY: &str = "storageKeysList";

/// Metadata key of the active collection pointer.
pub const LAST_SELECTED_KEY: &str = "lastSelectedStorageKey";

/// Metadata key of the deleted-name tombstones.
pub const DELETED_KEYS_KEY: &str = "deletedStorageKeys";

/// Metadata key of the last synced discussion links.
pub const DISCUSSION_LINKS_KEY: &str = "discussionLinks";

/// Prefix of per-collection record tables.
pub const RECORDS_TABLE_PREFIX: &str = "records/";

/// Definition type of a per-collection record table.
pub type RecordsTable<'a> = TableDefinition<'a, &'static str, &'static [u8]>;

/// Returns the table name holding `collection`'s records.
#[inline]
pub fn records_table_name(collection: &str) -> String {
    format!("{}{}", RECORDS_TABLE_PREFIX, collection)
}

/// Returns the definition of a record table from its full name.
#[inline]
pub fn records_table(table_name: &str) -> RecordsTable<'_> {
    TableDefinition::new(table_name)
}

/// Database metadata stored in the metadata table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    /// Schema version for compatibility checking.
    pub schema_version: u32,

    /// Reserved default collection name, fixed at creation.
    pub default_collection: String,

    /// Timestamp when the database was created.
    pub created_at: Timestamp,

    /// Last time the database was opened (updated on each open).
    pub last_opened_at: Timestamp,
}

impl DatabaseMetadata {
    /// Creates new metadata for a fresh database.
    pub fn new(default_collection: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            schema_version: SCHEMA_VERSION,
            default_collection: default_collection.into(),
            created_at: now,
            last_opened_at: now,
        }
    }

    /// Updates the last_opened_at timestamp.
    pub fn touch(&mut self) {
        self.last_opened_at = Timestamp::now();
    }

    /// Checks if this metadata is compatible with the current schema.
    pub fn is_compatible(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}
