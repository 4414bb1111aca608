//! Page-side request handling.
//!
//! [`PageAgent`] is what runs next to the rendered page: it reads the page
//! through a [`PageSource`], extracts, fingerprints, and answers requests.
//! Navigation for `nextQuestion` is delegated to a [`Navigator`].

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};
use url::Url;

use super::protocol::{CurrentQuestion, NavigationAck, Request, Response, TempData};
use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::extract::{current_question_number, discussion_links, extract, question_label, PageContent};

/// Read access to the page currently loaded in the tab.
pub trait PageSource: Send + Sync {
    /// Returns a snapshot of the rendered page.
    fn page(&self) -> PageContent;
}

/// Performs the navigation requested by `nextQuestion`.
pub trait Navigator: Send + Sync {
    /// Navigates the tab to `url`.
    fn navigate(&self, url: &Url) -> Result<()>;
}

/// A page source holding a replaceable snapshot.
#[derive(Debug, Default)]
pub struct StaticPage {
    content: RwLock<PageContent>,
}

impl StaticPage {
    /// Creates a source serving `content`.
    pub fn new(content: PageContent) -> Self {
        Self {
            content: RwLock::new(content),
        }
    }

    /// Replaces the page, as after a navigation.
    pub fn set(&self, content: PageContent) {
        *self.content.write().unwrap_or_else(|e| e.into_inner()) = content;
    }
}

impl PageSource for StaticPage {
    fn page(&self) -> PageContent {
        self.content
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// A navigator that records requested URLs instead of navigating.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: RwLock<Vec<Url>>,
}

impl RecordingNavigator {
    /// Creates an empty navigator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every URL navigated to, oldest first.
    pub fn visited(&self) -> Vec<Url> {
        self.visited
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        self.visited
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.clone());
        Ok(())
    }
}

/// Builds the web search URL for `search_key`, restricted to `site_domain`.
///
/// The query is `site:<domain> <key>` in the `q` parameter, appended to any
/// parameters already on `base`.
pub fn search_url(base: &Url, site_domain: &str, search_key: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("q", &format!("site:{} {}", site_domain, search_key));
    url
}

/// Answers controller requests for one page.
pub struct PageAgent {
    source: Arc<dyn PageSource>,
    navigator: Arc<dyn Navigator>,
    search_base: Url,
    site_domain: String,
}

impl std::fmt::Debug for PageAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageAgent")
            .field("search_base", &self.search_base.as_str())
            .field("site_domain", &self.site_domain)
            .finish_non_exhaustive()
    }
}

impl PageAgent {
    /// Creates an agent reading `source` and navigating with `navigator`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config.search_url` is not a URL.
    pub fn new(
        source: Arc<dyn PageSource>,
        navigator: Arc<dyn Navigator>,
        config: &Config,
    ) -> Result<Self> {
        let search_base = Url::parse(&config.search_url)
            .map_err(|e| VaultError::config(format!("invalid search_url: {}", e)))?;

        Ok(Self {
            source,
            navigator,
            search_base,
            site_domain: config.site_domain.clone(),
        })
    }

    /// Answers one request.
    pub fn handle(&self, request: &Request) -> Response {
        debug!(action = request.action(), "Page request");

        match request {
            Request::GetTempData => {
                let page = self.source.page();
                Response::TempData(extract(&page).map(TempData::from_record))
            }
            Request::GetCurrentQuestion => {
                let page = self.source.page();
                Response::CurrentQuestion(CurrentQuestion {
                    question: current_question_number(&page).map(question_label),
                })
            }
            Request::NextQuestion { search_key } => {
                let url = search_url(&self.search_base, &self.site_domain, search_key);
                let navigated = match self.navigator.navigate(&url) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(error = %e, url = %url, "Navigation failed");
                        false
                    }
                };
                Response::Navigation(NavigationAck { navigated })
            }
            Request::GetDiscussionLinks => {
                let page = self.source.page();
                Response::DiscussionLinks(discussion_links(&page))
            }
        }
    }

    /// Answers a JSON-encoded request with a JSON-encoded reply.
    pub fn handle_json(&self, json: &str) -> Result<String> {
        let request = Request::from_json(json)?;
        self.handle(&request).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;
    use crate::record::Record;

    fn question_page() -> PageContent {
        PageContent::with_prompt("Q1")
            .correct_choice("A", "A. x Most Voted")
            .choice("B", "B. y")
            .header("Topic 1 Question #: 7")
    }

    fn agent(page: PageContent) -> (PageAgent, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        let agent = PageAgent::new(
            Arc::new(StaticPage::new(page)),
            navigator.clone(),
            &Config::default(),
        )
        .unwrap();
        (agent, navigator)
    }

    #[test]
    fn test_get_temp_data() {
        let (agent, _) = agent(question_page());
        let data = agent
            .handle(&Request::GetTempData)
            .into_temp_data()
            .unwrap()
            .unwrap();

        assert_eq!(data.question, "Q1\nA. x\nB. y");
        assert_eq!(data.answer, "A");
        assert_eq!(data.hash, Record::new("Q1\nA. x\nB. y", "A").fingerprint());
    }

    #[test]
    fn test_get_temp_data_without_prompt() {
        let (agent, _) = agent(PageContent::default());
        let reply = agent.handle(&Request::GetTempData);
        assert_eq!(reply, Response::TempData(None));
    }

    #[test]
    fn test_get_current_question() {
        let (agent, _) = agent(question_page());
        let current = agent
            .handle(&Request::GetCurrentQuestion)
            .into_current_question()
            .unwrap();
        assert_eq!(current.question.as_deref(), Some("Question #: 7"));
    }

    #[test]
    fn test_next_question_navigates_to_search() {
        let (agent, navigator) = agent(question_page());
        let ack = agent
            .handle(&Request::NextQuestion {
                search_key: "SAA-C03 question 8 discussion".into(),
            })
            .into_navigation()
            .unwrap();

        assert!(ack.navigated);
        let visited = navigator.visited();
        assert_eq!(visited.len(), 1);
        let query: Vec<(String, String)> = visited[0].query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![(
                "q".to_string(),
                "site:examtopics.com SAA-C03 question 8 discussion".to_string()
            )]
        );
    }

    #[test]
    fn test_failed_navigation_is_acknowledged_false() {
        struct Refusing;
        impl Navigator for Refusing {
            fn navigate(&self, _url: &Url) -> Result<()> {
                Err(DeliveryError::unreachable("tab closed").into())
            }
        }

        let agent = PageAgent::new(
            Arc::new(StaticPage::default()),
            Arc::new(Refusing),
            &Config::default(),
        )
        .unwrap();
        let ack = agent
            .handle(&Request::NextQuestion {
                search_key: "x".into(),
            })
            .into_navigation()
            .unwrap();
        assert!(!ack.navigated);
    }

    #[test]
    fn test_handle_json() {
        let (agent, _) = agent(question_page());
        let reply = agent
            .handle_json(r#"{"action":"getCurrentQuestion"}"#)
            .unwrap();
        assert_eq!(reply, r#"{"question":"Question #: 7"}"#);

        let err = agent.handle_json("not json").unwrap_err();
        assert!(err.is_delivery());
    }

    #[test]
    fn test_page_can_change() {
        let page = Arc::new(StaticPage::new(PageContent::default()));
        let agent = PageAgent::new(
            page.clone(),
            Arc::new(RecordingNavigator::new()),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(agent.handle(&Request::GetTempData), Response::TempData(None));

        page.set(question_page());
        assert!(matches!(
            agent.handle(&Request::GetTempData),
            Response::TempData(Some(_))
        ));
    }
}
