//! Collection registry module.
//!
//! A **collection** is a named, independently stored set of records. The
//! registry keeps:
//! - The ordered list of known names (the default name is always present)
//! - The active-collection pointer, persisted across sessions
//! - Tombstones for deleted names, so a pointer left on a deleted
//!   collection reads as the default
//!
//! # Operations
//!
//! All registry operations are available on [`QuizVault`](crate::QuizVault):
//!
//! - [`list_collections()`](crate::QuizVault::list_collections)
//! - [`create_collection(name)`](crate::QuizVault::create_collection)
//! - [`set_active_collection(name)`](crate::QuizVault::set_active_collection)
//! - [`active_collection()`](crate::QuizVault::active_collection)
//! - [`delete_collection(name)`](crate::QuizVault::delete_collection)
//!
//! # Constraints
//!
//! - Names are trimmed; blank names are ignored (not an error)
//! - Names must be at most 255 bytes
//! - The default collection can never be deleted

pub mod types;

pub use types::{ActivePointer, RegistryState};

use crate::error::{VaultError, ValidationError};

/// Maximum length of a collection name in bytes.
pub const MAX_COLLECTION_NAME_LENGTH: usize = 255;

/// Normalizes a user-supplied collection name.
///
/// Returns `Ok(None)` for blank input, which callers treat as a no-op.
pub(crate) fn normalize_collection_name(name: &str) -> Result<Option<&str>, VaultError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return Err(ValidationError::invalid_field(
            "name",
            format!(
                "must be at most {} bytes, got {}",
                MAX_COLLECTION_NAME_LENGTH,
                name.len()
            ),
        )
        .into());
    }

    Ok(Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_collection_name("  setA ").unwrap(), Some("setA"));
    }

    #[test]
    fn test_normalize_blank_is_none() {
        assert_eq!(normalize_collection_name("").unwrap(), None);
        assert_eq!(normalize_collection_name(" \t\n").unwrap(), None);
    }

    #[test]
    fn test_normalize_max_length() {
        let name = "x".repeat(MAX_COLLECTION_NAME_LENGTH);
        assert!(normalize_collection_name(&name).unwrap().is_some());

        let err = normalize_collection_name(&"x".repeat(256)).unwrap_err();
        assert!(err.is_validation());
    }
}
