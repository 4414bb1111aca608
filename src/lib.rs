//! # QuizVault
//!
//! Capture, deduplicate, and export exam questions scraped from a
//! discussion site.
//!
//! QuizVault is the core of a quiz-scraping browser extension: it turns a
//! rendered question page into a normalized record, files it under a
//! content fingerprint in a named collection, and exports collections as
//! plain text.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quizvault::{QuizVault, Config};
//! use quizvault::extract::{extract, PageContent};
//!
//! // Open or create a vault
//! let vault = QuizVault::open("./quiz.db", Config::default())?;
//!
//! // Extract the question on a page
//! let page = PageContent::with_prompt("Which service stores objects?")
//!     .correct_choice("A", "A. S3 Most Voted")
//!     .choice("B", "B. EC2");
//! let record = extract(&page).expect("page has a question");
//!
//! // Store it in the active collection (a second capture is a no-op)
//! let active = vault.active_collection()?;
//! let capture = vault.capture(&active, &record)?;
//!
//! // Export as text
//! vault.export_to(&active, "./exports")?;
//!
//! vault.close()?;
//! ```
//!
//! ## Key Concepts
//!
//! ### Record
//!
//! A **record** is a question (prompt plus lettered choices) and the
//! comma-joined letters of its correct choices.
//!
//! ### Fingerprint
//!
//! A **fingerprint** is a 32-bit hash of the question text rendered as
//! signed hex. It is the only dedup key, so distinct questions may collide.
//!
//! ### Collection
//!
//! A **collection** is a named set of records. One reserved collection
//! (`quizletData` by default) always exists and cannot be deleted. The
//! **active collection** is where captures and exports go.
//!
//! ### Page context
//!
//! Extraction runs next to the rendered page, reached only through
//! messages. See [`messaging`] for the contract and [`controller`] for the
//! driver the UI calls.
//!
//! ## Thread Safety
//!
//! `QuizVault` is `Send + Sync` and can be shared across threads using `Arc`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============================================================================
// Module declarations
// ============================================================================

mod config;
mod db;
mod error;
mod fingerprint;
mod record;
mod types;

pub mod collection;
pub mod controller;
pub mod export;
pub mod extract;
pub mod messaging;
pub mod storage;

// ============================================================================
// Public API re-exports
// ============================================================================

// Main vault interface
pub use db::QuizVault;

// Configuration
pub use config::{Config, SyncMode, DEFAULT_COLLECTION, DEFAULT_SEARCH_URL, DEFAULT_SITE_DOMAIN};

// Error handling
pub use error::{
    DeliveryError, ProtectedResourceError, Result, StorageError, ValidationError, VaultError,
};

// Core types
pub use fingerprint::fingerprint;
pub use record::{Capture, Record};
pub use types::{Fingerprint, Timestamp};

// Domain types
pub use collection::ActivePointer;
pub use controller::{AdvanceOutcome, Controller, CrawlState, PopupView, QuestionTitle};
pub use export::ExportOrder;

// Storage (for advanced users)
pub use storage::{DatabaseMetadata, ImportSummary};

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Convenient imports for common QuizVault usage.
///
/// ```rust
/// use quizvault::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Config, SyncMode};
    pub use crate::controller::{Controller, CrawlState};
    pub use crate::db::QuizVault;
    pub use crate::error::{Result, VaultError};
    pub use crate::extract::{extract, PageContent};
    pub use crate::fingerprint::fingerprint;
    pub use crate::messaging::{LocalTransport, PageAgent, PageTransport};
    pub use crate::record::Record;
    pub use crate::types::Fingerprint;
}
