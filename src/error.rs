//! Error types for QuizVault.
//!
//! QuizVault uses a hierarchical error system:
//! - `VaultError` is the top-level error returned by all public APIs
//! - Specific error types (`StorageError`, `DeliveryError`, ...) provide detail
//!
//! "No question on the page" is not an error: extraction returns `None`.
//! Fingerprint collisions are not errors either; they read as "already
//! captured".
//!
//! # Error Handling Pattern
//! ```rust,ignore
//! use quizvault::{QuizVault, Config, Result};
//!
//! fn example() -> Result<()> {
//!     let vault = QuizVault::open("./quiz.db", Config::default())?;
//!     // ... operations that may fail ...
//!     vault.close()?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

/// Result type alias for QuizVault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Top-level error enum for all QuizVault operations.
///
/// This is the only error type returned by public APIs.
/// Use pattern matching to handle specific error cases.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Storage layer error (I/O, corruption, transactions).
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of what's wrong with the configuration.
        reason: String,
    },

    /// The page context could not be reached or answered garbage.
    #[error("Message delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// Attempt to remove something that must always exist.
    #[error("{0}")]
    Protected(#[from] ProtectedResourceError),

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Creates a configuration error with the given reason.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if the page context could not be reached.
    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }

    /// Returns true if this is a protected-resource refusal.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected(_))
    }
}

/// Storage-related errors.
///
/// These errors indicate problems with the underlying key/value store.
/// The operation that raised one was aborted without a partial write.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database file or data is corrupted.
    #[error("Database corrupted: {0}")]
    Corrupted(String),

    /// Database is locked by another process.
    #[error("Database is locked by another writer")]
    DatabaseLocked,

    /// Transaction failed (commit, rollback, etc.).
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from the redb storage engine.
    #[error("Storage engine error: {0}")]
    Redb(String),

    /// Database schema version doesn't match expected version.
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch {
        /// Expected schema version.
        expected: u32,
        /// Actual schema version found in database.
        found: u32,
    },
}

impl StorageError {
    /// Creates a corruption error with the given message.
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    /// Creates a transaction error with the given message.
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

// Conversions from redb error types
impl From<redb::Error> for StorageError {
    fn from(err: redb::Error) -> Self {
        StorageError::Redb(err.to_string())
    }
}

impl From<redb::DatabaseError> for StorageError {
    fn from(err: redb::DatabaseError) -> Self {
        StorageError::Redb(err.to_string())
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(err: redb::TransactionError) -> Self {
        StorageError::Transaction(err.to_string())
    }
}

impl From<redb::CommitError> for StorageError {
    fn from(err: redb::CommitError) -> Self {
        StorageError::Transaction(format!("Commit failed: {}", err))
    }
}

impl From<redb::TableError> for StorageError {
    fn from(err: redb::TableError) -> Self {
        StorageError::Redb(format!("Table error: {}", err))
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(err: redb::StorageError) -> Self {
        StorageError::Redb(format!("Storage error: {}", err))
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

// Also allow direct conversion to VaultError for convenience
impl From<redb::TransactionError> for VaultError {
    fn from(err: redb::TransactionError) -> Self {
        VaultError::Storage(StorageError::from(err))
    }
}

impl From<redb::CommitError> for VaultError {
    fn from(err: redb::CommitError) -> Self {
        VaultError::Storage(StorageError::from(err))
    }
}

impl From<redb::TableError> for VaultError {
    fn from(err: redb::TableError) -> Self {
        VaultError::Storage(StorageError::from(err))
    }
}

impl From<redb::StorageError> for VaultError {
    fn from(err: redb::StorageError) -> Self {
        VaultError::Storage(StorageError::from(err))
    }
}

impl From<bincode::Error> for VaultError {
    fn from(err: bincode::Error) -> Self {
        VaultError::Storage(StorageError::from(err))
    }
}

/// Validation errors for input data.
///
/// These errors indicate problems with data provided by the caller.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field has an invalid value.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Name of the invalid field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// A required field is missing or empty.
    #[error("Required field missing: {field}")]
    RequiredField {
        /// Name of the missing field.
        field: String,
    },

    /// A stored key is not a well-formed fingerprint.
    #[error("Malformed fingerprint: {0:?}")]
    MalformedFingerprint(String),
}

impl ValidationError {
    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a required field error.
    pub fn required_field(field: impl Into<String>) -> Self {
        Self::RequiredField {
            field: field.into(),
        }
    }
}

/// Failures to exchange a message with the page context.
///
/// The page context lives in another execution environment (a browser tab,
/// an injected script). When it is gone or answers out of contract, callers
/// get one of these instead of a silent "no question".
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Nothing is listening on the other side (tab closed, navigated away).
    #[error("Page context unreachable: {0}")]
    Unreachable(String),

    /// The round trip did not complete in time.
    #[error("No reply from page context within {0:?}")]
    Timeout(Duration),

    /// The reply could not be decoded for the request that was sent.
    #[error("Malformed reply to '{action}': {reason}")]
    Malformed {
        /// Action of the request being answered.
        action: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// The reply decoded, but to the wrong kind of response.
    #[error("Unexpected reply to '{0}'")]
    UnexpectedReply(&'static str),
}

impl DeliveryError {
    /// Creates an unreachable error with the given message.
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Creates a malformed-reply error for the given action.
    pub fn malformed(action: &'static str, reason: impl ToString) -> Self {
        Self::Malformed {
            action,
            reason: reason.to_string(),
        }
    }
}

/// Refusals to remove resources that must always exist.
#[derive(Debug, Error)]
pub enum ProtectedResourceError {
    /// The default collection cannot be deleted.
    #[error("Cannot delete the default collection '{0}'")]
    DefaultCollection(String),
}
