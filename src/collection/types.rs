//! Type definitions for the collection registry.

use serde::{Deserialize, Serialize};

/// Persisted registry state, exactly as stored.
///
/// The raw values may be incomplete (first run, legacy dumps); use
/// [`names`](Self::names) and [`active`](Self::active) to read them with
/// defaults applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Stored list of collection names, `None` before the first write.
    pub names: Option<Vec<String>>,

    /// Stored active-collection pointer.
    pub active: Option<String>,

    /// Names removed by a delete and neither created nor selected since.
    pub deleted: Vec<String>,
}

impl RegistryState {
    /// Returns the known collection names, default first if it was missing.
    pub fn names(&self, default: &str) -> Vec<String> {
        let mut names = self.names.clone().unwrap_or_default();
        if !names.iter().any(|n| n == default) {
            names.insert(0, default.to_string());
        }
        names
    }

    /// Returns true if `name` is a known collection.
    pub fn contains(&self, name: &str, default: &str) -> bool {
        name == default
            || self
                .names
                .as_deref()
                .is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// Resolves the active collection.
    ///
    /// An unset pointer, or one whose name was deleted after it was set,
    /// reads as the default. A pointer to a name that was never created is
    /// returned unchanged.
    pub fn active(&self, default: &str) -> String {
        match &self.active {
            Some(name) if self.is_stale(name, default) => default.to_string(),
            Some(name) => name.clone(),
            None => default.to_string(),
        }
    }

    /// Returns the state of the active pointer.
    pub fn pointer(&self, default: &str) -> ActivePointer {
        match &self.active {
            None => ActivePointer::Unset,
            Some(name) if self.is_stale(name, default) => ActivePointer::BoundToDeleted,
            Some(_) => ActivePointer::Bound,
        }
    }

    fn is_stale(&self, name: &str, default: &str) -> bool {
        self.deleted.iter().any(|d| d == name) && !self.contains(name, default)
    }

    /// Registers `name`; returns false if it is already known.
    ///
    /// `name` must already be trimmed and validated.
    pub(crate) fn add(&mut self, name: &str, default: &str) -> bool {
        if self.contains(name, default) {
            return false;
        }
        let mut names = self.names(default);
        names.push(name.to_string());
        self.names = Some(names);
        self.deleted.retain(|d| d != name);
        true
    }

    /// Points the active pointer at `name`, stored as given.
    ///
    /// Clears any tombstone for `name`, so only a later delete makes the
    /// pointer read as the default.
    pub(crate) fn set_active(&mut self, name: &str) {
        self.deleted.retain(|d| d != name);
        self.active = Some(name.to_string());
    }

    /// Returns true if the active pointer names `name`.
    pub(crate) fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }

    /// Unregisters `name` and records a tombstone for it.
    pub(crate) fn remove(&mut self, name: &str, default: &str) {
        let mut names = self.names(default);
        names.retain(|n| n != name);
        self.names = Some(names);
        if !self.deleted.iter().any(|d| d == name) {
            self.deleted.push(name.to_string());
        }
    }
}

/// States of the active-collection pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivePointer {
    /// Never set.
    Unset,

    /// Points at a name not deleted since it was set.
    Bound,

    /// Points at a name deleted after it was set; reads as the default.
    BoundToDeleted,
}
