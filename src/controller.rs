//! The driver behind the extension popup.
//!
//! A [`Controller`] is built once with the vault and a transport to the page
//! context, and every UI action maps to one method. Failures to reach the
//! page never escape as errors from the status methods ([`title`],
//! [`check`], [`crawl`]); they become a state the UI can show.
//!
//! ```text
//!   UI action ──▶ Controller ──▶ PageTransport ──▶ PageAgent
//!                    │
//!                    └──▶ spawn_blocking ──▶ QuizVault ──▶ StorageEngine
//! ```
//!
//! [`title`]: Controller::title
//! [`check`]: Controller::check
//! [`crawl`]: Controller::crawl

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::db::QuizVault;
use crate::error::{DeliveryError, Result, StorageError};
use crate::messaging::{PageTransport, Request, Response};

/// Status of the crawl button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrawlState {
    /// The page holds a question not yet stored.
    Ready,

    /// The active collection already holds this question.
    AlreadyCrawled,

    /// The page holds no question.
    NoQuestion,

    /// The question was just stored.
    Done,

    /// Checking the page failed.
    Failed,

    /// Crawling failed; the user may retry.
    Retry,
}

impl CrawlState {
    /// Returns the button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "Crawl",
            Self::AlreadyCrawled => "Already Crawled",
            Self::NoQuestion => "No Question",
            Self::Done => "Crawl Done",
            Self::Failed => "Error",
            Self::Retry => "Error! Try Again",
        }
    }

    /// Returns true if the button accepts a click.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Ready | Self::Retry)
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Popup title derived from the page header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestionTitle {
    /// `"Question #: N"` as reported by the page.
    Current(String),

    /// The page shows no question header.
    NoneSelected,

    /// The page could not be reached.
    Unavailable,
}

impl QuestionTitle {
    /// Returns the title text.
    pub fn label(&self) -> &str {
        match self {
            Self::Current(label) => label,
            Self::NoneSelected => "No question selected",
            Self::Unavailable => "Error loading question",
        }
    }
}

/// Result of [`Controller::advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Auto-advance is turned off in the configuration.
    Disabled,

    /// The page reports no question number to advance from.
    NoQuestion,

    /// `nextQuestion` was delivered.
    Requested {
        /// Search terms sent to the page.
        search_key: String,

        /// Whether the page accepted the navigation.
        navigated: bool,
    },
}

/// Everything the popup shows when it opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupView {
    /// Known collections, in order.
    pub collections: Vec<String>,

    /// Active collection.
    pub active: String,

    /// Records in the active collection.
    pub count: u64,

    /// Title text.
    pub title: QuestionTitle,

    /// Crawl button state.
    pub crawl: CrawlState,
}

/// Builds the search key for the question after `current`.
pub fn next_search_key(exam: &str, current: u64) -> Option<String> {
    let next = current.checked_add(1)?;
    Some(format!("{} question {} discussion", exam.trim(), next))
}

/// Drives the vault and the page context on behalf of the UI.
pub struct Controller<T> {
    vault: Arc<QuizVault>,
    transport: T,
    delivery_timeout: Option<Duration>,
    auto_advance: bool,
}

impl<T> fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("vault", &self.vault)
            .field("delivery_timeout", &self.delivery_timeout)
            .field("auto_advance", &self.auto_advance)
            .finish_non_exhaustive()
    }
}

impl<T: PageTransport> Controller<T> {
    /// Creates a controller using the vault's configuration.
    pub fn new(vault: Arc<QuizVault>, transport: T) -> Self {
        let config = vault.config();
        let delivery_timeout = config.delivery_timeout;
        let auto_advance = config.auto_advance;
        Self {
            vault,
            transport,
            delivery_timeout,
            auto_advance,
        }
    }

    /// Returns the vault handle.
    pub fn vault(&self) -> &Arc<QuizVault> {
        &self.vault
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn request(&self, request: Request) -> Result<Response> {
        let send = self.transport.send(request);
        match self.delivery_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| DeliveryError::Timeout(limit))?,
            None => send.await,
        }
    }

    async fn with_vault<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&QuizVault) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let vault = Arc::clone(&self.vault);
        tokio::task::spawn_blocking(move || f(&vault))
            .await
            .map_err(|e| StorageError::transaction(format!("storage task failed: {}", e)))?
    }

    /// Reads the question header from the page.
    pub async fn title(&self) -> QuestionTitle {
        let reply = self
            .request(Request::GetCurrentQuestion)
            .await
            .and_then(|r| Ok(r.into_current_question()?));

        match reply {
            Ok(current) => match current.question {
                Some(label) => QuestionTitle::Current(label),
                None => QuestionTitle::NoneSelected,
            },
            Err(e) => {
                warn!(error = %e, "Could not read question header");
                QuestionTitle::Unavailable
            }
        }
    }

    /// Checks whether the page's question is already in the active
    /// collection.
    pub async fn check(&self) -> CrawlState {
        match self.try_check().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Question check failed");
                CrawlState::Failed
            }
        }
    }

    async fn try_check(&self) -> Result<CrawlState> {
        let reply = self.request(Request::GetTempData).await?.into_temp_data()?;
        let Some(data) = reply else {
            return Ok(CrawlState::NoQuestion);
        };

        let fingerprint = data.hash;
        let exists = self
            .with_vault(move |vault| {
                let active = vault.active_collection()?;
                vault.contains(&active, &fingerprint)
            })
            .await?;

        Ok(if exists {
            CrawlState::AlreadyCrawled
        } else {
            CrawlState::Ready
        })
    }

    /// Stores the page's question in the active collection.
    #[instrument(skip(self))]
    pub async fn crawl(&self) -> CrawlState {
        match self.try_crawl().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Crawl failed");
                CrawlState::Retry
            }
        }
    }

    async fn try_crawl(&self) -> Result<CrawlState> {
        let reply = self.request(Request::GetTempData).await?.into_temp_data()?;
        let Some(data) = reply else {
            return Ok(CrawlState::NoQuestion);
        };

        let (fingerprint, record) = data.into_parts();
        let inserted = self
            .with_vault(move |vault| {
                let active = vault.active_collection()?;
                vault.insert_if_absent(&active, &fingerprint, &record)
            })
            .await?;

        Ok(if inserted {
            CrawlState::Done
        } else {
            CrawlState::AlreadyCrawled
        })
    }

    /// Counts records in the active collection; 0 if storage fails.
    pub async fn question_count(&self) -> u64 {
        let count = self
            .with_vault(|vault| {
                let active = vault.active_collection()?;
                vault.count(&active)
            })
            .await;

        count.unwrap_or_else(|e| {
            warn!(error = %e, "Could not count questions");
            0
        })
    }

    /// Makes `name` the active collection.
    pub async fn select_collection(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.with_vault(move |vault| vault.set_active_collection(&name))
            .await
    }

    /// Creates a collection and selects it.
    ///
    /// Returns `false`, selecting nothing, for blank or existing names.
    pub async fn add_collection(&self, name: &str) -> Result<bool> {
        let name = name.to_string();
        self.with_vault(move |vault| {
            if !vault.create_collection(&name)? {
                return Ok(false);
            }
            vault.set_active_collection(name.trim())?;
            Ok(true)
        })
        .await
    }

    /// Deletes a collection and its records.
    pub async fn delete_collection(&self, name: &str) -> Result<u64> {
        let name = name.to_string();
        self.with_vault(move |vault| vault.delete_collection(&name))
            .await
    }

    /// Exports the active collection to `<dir>/<collection>.txt`.
    ///
    /// Returns `None` when the collection is empty.
    pub async fn export_to(&self, dir: impl Into<PathBuf>) -> Result<Option<PathBuf>> {
        let dir = dir.into();
        self.with_vault(move |vault| {
            let active = vault.active_collection()?;
            vault.export_to(&active, &dir)
        })
        .await
    }

    /// Reads the page's discussion links and replaces the stored ones.
    ///
    /// Returns the number of links stored.
    pub async fn sync_discussion_links(&self) -> Result<usize> {
        let links = self
            .request(Request::GetDiscussionLinks)
            .await?
            .into_discussion_links()?;
        let count = links.len();

        self.with_vault(move |vault| vault.save_discussion_links(&links))
            .await?;

        debug!(count, "Discussion links synced");
        Ok(count)
    }

    /// Asks the page to search for the question after the current one.
    ///
    /// The search key is `"<exam> question <n+1> discussion"`.
    #[instrument(skip(self))]
    pub async fn advance(&self, exam: &str) -> Result<AdvanceOutcome> {
        if !self.auto_advance {
            return Ok(AdvanceOutcome::Disabled);
        }

        let current = self
            .request(Request::GetCurrentQuestion)
            .await?
            .into_current_question()?;
        let Some(search_key) = current.number().and_then(|n| next_search_key(exam, n)) else {
            return Ok(AdvanceOutcome::NoQuestion);
        };

        let ack = self
            .request(Request::NextQuestion {
                search_key: search_key.clone(),
            })
            .await?
            .into_navigation()?;

        info!(search_key = %search_key, navigated = ack.navigated, "Advance requested");
        Ok(AdvanceOutcome::Requested {
            search_key,
            navigated: ack.navigated,
        })
    }

    /// Collects everything the popup shows when it opens.
    pub async fn refresh(&self) -> Result<PopupView> {
        let (collections, active) = self
            .with_vault(|vault| Ok((vault.list_collections()?, vault.active_collection()?)))
            .await?;

        let count = self.question_count().await;
        let title = self.title().await;
        let crawl = self.check().await;

        Ok(PopupView {
            collections,
            active,
            count,
            title,
            crawl,
        })
    }
}
