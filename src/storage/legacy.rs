//! Browser storage dump format.
//!
//! The browser extension kept everything in one flat JSON object:
//!
//! ```text
//! {
//!   "storageKeysList": ["quizletData", "setA"],
//!   "lastSelectedStorageKey": "setA",
//!   "quizletData": { "<fingerprint>": { "question": "...", "answer": "A" } },
//!   "setA": { ... }
//! }
//! ```
//!
//! [`LegacyDump`] reads and writes that shape so data collected by an older
//! install can be moved into a vault with its fingerprints unchanged.
//! Keys that are neither registry keys nor listed collections (scratch
//! values such as `tempQuizletData`) are reported in
//! [`skipped_keys`](LegacyDump::skipped_keys) and otherwise ignored.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use super::schema::{LAST_SELECTED_KEY, STORAGE_KEYS_LIST_KEY};
use crate::collection::{normalize_collection_name, RegistryState};
use crate::error::{Result, StorageError, ValidationError};
use crate::record::Record;
use crate::types::Fingerprint;

/// A parsed browser storage dump.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyDump {
    /// Value of `storageKeysList`, if present.
    pub names: Option<Vec<String>>,

    /// Value of `lastSelectedStorageKey`, if present.
    pub active: Option<String>,

    /// Records of every listed collection (and the default), by name.
    pub collections: BTreeMap<String, BTreeMap<Fingerprint, Record>>,

    /// Top-level keys that were not imported.
    pub skipped_keys: Vec<String>,
}

impl LegacyDump {
    /// Parses a dump.
    ///
    /// The whole input is validated before anything is returned: a bad
    /// name, a malformed fingerprint key or a record without both fields
    /// fails the parse. Stored fingerprints are kept even when they no
    /// longer match the record's question.
    pub fn parse(json: &str, default_collection: &str) -> Result<Self> {
        let root: Map<String, Value> = serde_json::from_str(json)
            .map_err(|e| ValidationError::invalid_field("dump", e.to_string()))?;

        let names = match root.get(STORAGE_KEYS_LIST_KEY) {
            Some(value) => {
                let raw: Vec<String> = serde_json::from_value(value.clone()).map_err(|e| {
                    ValidationError::invalid_field(STORAGE_KEYS_LIST_KEY, e.to_string())
                })?;
                let mut names = Vec::with_capacity(raw.len());
                for name in &raw {
                    if let Some(name) = normalize_collection_name(name)? {
                        if !names.iter().any(|n| n == name) {
                            names.push(name.to_string());
                        }
                    }
                }
                Some(names)
            }
            None => None,
        };

        let active = match root.get(LAST_SELECTED_KEY) {
            Some(Value::String(name)) => Some(name.clone()),
            Some(Value::Null) | None => None,
            Some(other) => {
                return Err(ValidationError::invalid_field(
                    LAST_SELECTED_KEY,
                    format!("expected a string, got {}", other),
                )
                .into())
            }
        };

        let is_collection = |key: &str| {
            key == default_collection
                || names
                    .as_deref()
                    .is_some_and(|names| names.iter().any(|n| n == key))
        };

        let mut collections = BTreeMap::new();
        let mut skipped_keys = Vec::new();
        for (key, value) in &root {
            if key == STORAGE_KEYS_LIST_KEY || key == LAST_SELECTED_KEY {
                continue;
            }
            if !is_collection(key) {
                skipped_keys.push(key.clone());
                continue;
            }
            collections.insert(key.clone(), parse_collection(key, value)?);
        }

        Ok(Self {
            names,
            active,
            collections,
            skipped_keys,
        })
    }

    /// Builds a dump from vault state.
    pub fn from_parts(
        registry: &RegistryState,
        default_collection: &str,
        collections: BTreeMap<String, BTreeMap<Fingerprint, Record>>,
    ) -> Self {
        Self {
            names: Some(registry.names(default_collection)),
            active: registry.active.clone(),
            collections,
            skipped_keys: Vec::new(),
        }
    }

    /// Returns the total number of records in the dump.
    pub fn record_count(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }

    /// Renders the dump in the browser storage shape.
    pub fn to_json(&self) -> Result<String> {
        let mut root = Map::new();
        if let Some(names) = &self.names {
            root.insert(
                STORAGE_KEYS_LIST_KEY.to_string(),
                serde_json::to_value(names).map_err(StorageError::from)?,
            );
        }
        if let Some(active) = &self.active {
            root.insert(LAST_SELECTED_KEY.to_string(), Value::String(active.clone()));
        }
        for (name, records) in &self.collections {
            root.insert(
                name.clone(),
                serde_json::to_value(records).map_err(StorageError::from)?,
            );
        }

        let json = serde_json::to_string_pretty(&Value::Object(root)).map_err(StorageError::from)?;
        Ok(json)
    }
}

/// Result of importing a dump into a vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of collections that carried records.
    pub collections: usize,

    /// Records written; records already present are not counted.
    pub records_inserted: u64,

    /// Top-level keys that were not imported.
    pub skipped_keys: Vec<String>,
}

fn parse_collection(name: &str, value: &Value) -> Result<BTreeMap<Fingerprint, Record>> {
    let Value::Object(entries) = value else {
        return Err(ValidationError::invalid_field(name, "expected an object of records").into());
    };

    let mut records = BTreeMap::new();
    for (key, entry) in entries {
        let fingerprint = Fingerprint::parse(key)?;
        let record: Record = serde_json::from_value(entry.clone())
            .map_err(|e| ValidationError::invalid_field(format!("{}.{}", name, key), e.to_string()))?;

        if record.fingerprint() != fingerprint {
            warn!(
                collection = %name,
                stored = %fingerprint,
                computed = %record.fingerprint(),
                "Legacy record fingerprint does not match its question"
            );
        }
        records.insert(fingerprint, record);
    }
    Ok(records)
}
