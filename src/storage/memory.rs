//! In-process storage engine.
//!
//! `MemoryStorage` keeps everything behind one `RwLock` and loses it on
//! drop. It backs [`QuizVault::in_memory`](crate::QuizVault::in_memory)
//! and the controller tests.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::schema::DatabaseMetadata;
use super::StorageEngine;
use crate::collection::RegistryState;
use crate::config::Config;
use crate::error::{Result, StorageError};
use crate::extract::DiscussionLink;
use crate::record::Record;
use crate::types::Fingerprint;

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, BTreeMap<Fingerprint, Record>>,
    registry: RegistryState,
    discussion_links: Vec<DiscussionLink>,
}

/// Storage engine holding all state in process memory.
#[derive(Debug)]
pub struct MemoryStorage {
    metadata: DatabaseMetadata,
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    /// Creates an empty store for the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            metadata: DatabaseMetadata::new(config.default_collection.as_str()),
            state: RwLock::new(MemoryState::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| StorageError::transaction("memory store lock poisoned").into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| StorageError::transaction("memory store lock poisoned").into())
    }
}

impl StorageEngine for MemoryStorage {
    fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!("Memory storage dropped");
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        None
    }

    fn record_exists(&self, collection: &str, fingerprint: &Fingerprint) -> Result<bool> {
        let state = self.read()?;
        Ok(state
            .collections
            .get(collection)
            .is_some_and(|records| records.contains_key(fingerprint)))
    }

    fn get_record(&self, collection: &str, fingerprint: &Fingerprint) -> Result<Option<Record>> {
        let state = self.read()?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|records| records.get(fingerprint))
            .cloned())
    }

    fn insert_record_if_absent(
        &self,
        collection: &str,
        fingerprint: &Fingerprint,
        record: &Record,
    ) -> Result<bool> {
        let mut state = self.write()?;
        let records = state.collections.entry(collection.to_string()).or_default();
        if records.contains_key(fingerprint) {
            return Ok(false);
        }
        records.insert(fingerprint.clone(), record.clone());
        Ok(true)
    }

    fn list_records(&self, collection: &str) -> Result<BTreeMap<Fingerprint, Record>> {
        let state = self.read()?;
        Ok(state.collections.get(collection).cloned().unwrap_or_default())
    }

    fn count_records(&self, collection: &str) -> Result<u64> {
        let state = self.read()?;
        Ok(state
            .collections
            .get(collection)
            .map_or(0, |records| records.len() as u64))
    }

    fn delete_records(&self, collection: &str) -> Result<u64> {
        let mut state = self.write()?;
        Ok(state
            .collections
            .remove(collection)
            .map_or(0, |records| records.len() as u64))
    }

    fn load_registry(&self) -> Result<RegistryState> {
        Ok(self.read()?.registry.clone())
    }

    fn save_registry(&self, state: &RegistryState) -> Result<()> {
        self.write()?.registry = state.clone();
        Ok(())
    }

    fn import_collections(
        &self,
        registry: &RegistryState,
        collections: &BTreeMap<String, BTreeMap<Fingerprint, Record>>,
    ) -> Result<u64> {
        let mut state = self.write()?;
        state.registry = registry.clone();

        let mut inserted = 0u64;
        for (collection, records) in collections {
            let stored = state.collections.entry(collection.clone()).or_default();
            for (fingerprint, record) in records {
                if !stored.contains_key(fingerprint) {
                    stored.insert(fingerprint.clone(), record.clone());
                    inserted += 1;
                }
            }
        }
        Ok(inserted)
    }

    fn remove_collection(&self, registry: &RegistryState, collection: &str) -> Result<u64> {
        let mut state = self.write()?;
        state.registry = registry.clone();
        Ok(state
            .collections
            .remove(collection)
            .map_or(0, |records| records.len() as u64))
    }

    fn load_discussion_links(&self) -> Result<Vec<DiscussionLink>> {
        Ok(self.read()?.discussion_links.clone())
    }

    fn save_discussion_links(&self, links: &[DiscussionLink]) -> Result<()> {
        self.write()?.discussion_links = links.to_vec();
        Ok(())
    }
}
