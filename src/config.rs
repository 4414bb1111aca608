//! Configuration types for QuizVault.
//!
//! The [`Config`] struct controls vault behavior including:
//! - The reserved default collection name
//! - Durability of writes
//! - Auto-advance (web search for the next question) and its search target
//! - Export field order and an optional delivery timeout
//!
//! # Example
//! ```rust
//! use quizvault::{Config, SyncMode};
//!
//! // Use defaults ("quizletData" default collection, no auto-advance)
//! let config = Config::default();
//!
//! // Turn on auto-advance with faster writes
//! let config = Config {
//!     auto_advance: true,
//!     sync_mode: SyncMode::Fast,
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::collection::MAX_COLLECTION_NAME_LENGTH;
use crate::error::ValidationError;
use crate::export::ExportOrder;

/// Name of the collection that exists on first run and cannot be deleted.
pub const DEFAULT_COLLECTION: &str = "quizletData";

/// Site the extension is active on.
pub const DEFAULT_SITE_DOMAIN: &str = "examtopics.com";

/// Search endpoint used by auto-advance.
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";

/// Vault configuration options.
///
/// All fields have sensible defaults. Use struct update syntax to override
/// specific settings:
///
/// ```rust
/// use quizvault::Config;
///
/// let config = Config {
///     default_collection: "inbox".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Reserved default collection name.
    ///
    /// Locked into the database on creation; reopening with a different
    /// value is a configuration error.
    pub default_collection: String,

    /// Durability mode for write operations.
    pub sync_mode: SyncMode,

    /// Whether the controller may ask the page to search for the next
    /// question.
    pub auto_advance: bool,

    /// Host suffix of the supported exam-discussion site.
    pub site_domain: String,

    /// Search endpoint; the query is passed in the `q` parameter.
    pub search_url: String,

    /// Field order used by text export.
    pub export_order: ExportOrder,

    /// Upper bound for one message round trip to the page context.
    ///
    /// `None` (the default) waits indefinitely, like the extension does.
    pub delivery_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_collection: DEFAULT_COLLECTION.to_string(),
            sync_mode: SyncMode::Normal,
            auto_advance: false,
            site_domain: DEFAULT_SITE_DOMAIN.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            export_order: ExportOrder::QuestionFirst,
            delivery_timeout: None,
        }
    }
}

impl Config {
    /// Creates a Config with auto-advance enabled.
    pub fn with_auto_advance() -> Self {
        Self {
            auto_advance: true,
            ..Default::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Called automatically by `QuizVault::open()`.
    ///
    /// # Errors
    /// Returns `ValidationError` if:
    /// - `default_collection` is blank or longer than 255 bytes
    /// - `site_domain` is empty
    /// - `search_url` is not an absolute URL
    /// - `delivery_timeout` is zero
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_collection.trim().is_empty() {
            return Err(ValidationError::required_field("default_collection"));
        }

        if self.default_collection.len() > MAX_COLLECTION_NAME_LENGTH {
            return Err(ValidationError::invalid_field(
                "default_collection",
                format!("must be at most {} bytes", MAX_COLLECTION_NAME_LENGTH),
            ));
        }

        if self.site_domain.trim().is_empty() {
            return Err(ValidationError::required_field("site_domain"));
        }

        if let Err(e) = Url::parse(&self.search_url) {
            return Err(ValidationError::invalid_field(
                "search_url",
                format!("not an absolute URL: {}", e),
            ));
        }

        if self.delivery_timeout == Some(Duration::ZERO) {
            return Err(ValidationError::invalid_field(
                "delivery_timeout",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Returns true if `url` belongs to the supported site.
    ///
    /// Matches the configured domain and any of its subdomains.
    ///
    /// # Example
    /// ```rust
    /// use quizvault::Config;
    /// use url::Url;
    ///
    /// let config = Config::default();
    /// let page = Url::parse("https://www.examtopics.com/discussions/").unwrap();
    /// assert!(config.is_supported_url(&page));
    /// ```
    pub fn is_supported_url(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let domain = self.site_domain.trim().trim_start_matches('.');
        host == domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

/// Durability mode for write operations.
///
/// Controls the trade-off between write performance and crash safety.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Sync to disk on transaction commit.
    ///
    /// This is the default and recommended setting.
    #[default]
    Normal,

    /// Defer the fsync (faster writes, may lose recent captures on crash).
    Fast,
}

impl SyncMode {
    /// Returns true if this mode is async (may lose data on crash).
    pub fn is_fast(&self) -> bool {
        matches!(self, Self::Fast)
    }
}
