//! End-to-end tests of the controller talking to a page agent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quizvault::extract::{DiscussionLink, PageContent};
use quizvault::messaging::{
    LocalTransport, PageAgent, PageTransport, RecordingNavigator, Request, Response, StaticPage,
};
use quizvault::{
    AdvanceOutcome, Config, Controller, CrawlState, DeliveryError, QuestionTitle, QuizVault,
    Record, Result, VaultError,
};
use tempfile::tempdir;

struct Harness {
    page: Arc<StaticPage>,
    navigator: Arc<RecordingNavigator>,
    agent: Arc<PageAgent>,
    controller: Controller<LocalTransport>,
}

fn harness(config: Config, page: PageContent) -> Harness {
    let vault = Arc::new(QuizVault::in_memory(config.clone()).unwrap());
    let page = Arc::new(StaticPage::new(page));
    let navigator = Arc::new(RecordingNavigator::new());
    let agent = Arc::new(PageAgent::new(page.clone(), navigator.clone(), &config).unwrap());
    let controller = Controller::new(vault, LocalTransport::new(&agent));
    Harness {
        page,
        navigator,
        agent,
        controller,
    }
}

fn question_page() -> PageContent {
    PageContent::with_prompt("Which service stores objects?")
        .correct_choice("A", "A. S3 Most Voted")
        .choice("B", "B. EC2")
        .header("Question #: 41 Topic 1")
}

// ============================================================================
// Crawl
// ============================================================================

#[tokio::test]
async fn test_crawl_then_already_crawled() {
    let h = harness(Config::default(), question_page());

    assert_eq!(h.controller.check().await, CrawlState::Ready);
    assert_eq!(h.controller.crawl().await, CrawlState::Done);
    assert_eq!(h.controller.check().await, CrawlState::AlreadyCrawled);
    assert_eq!(h.controller.crawl().await, CrawlState::AlreadyCrawled);
    assert_eq!(h.controller.question_count().await, 1);

    let records = h.controller.vault().records("quizletData").unwrap();
    let record = records.values().next().unwrap();
    assert_eq!(
        record,
        &Record::new("Which service stores objects?\nA. S3\nB. EC2", "A")
    );
    assert_eq!(records.keys().next().unwrap().as_str(), "-12deff8a");
}

#[tokio::test]
async fn test_no_question_page() {
    let h = harness(Config::default(), PageContent::default());

    assert_eq!(h.controller.check().await, CrawlState::NoQuestion);
    assert_eq!(h.controller.crawl().await, CrawlState::NoQuestion);
    assert_eq!(h.controller.title().await, QuestionTitle::NoneSelected);
    assert_eq!(h.controller.question_count().await, 0);
}

#[tokio::test]
async fn test_crawl_targets_active_collection() {
    let h = harness(Config::default(), question_page());

    assert!(h.controller.add_collection("setA").await.unwrap());
    assert_eq!(h.controller.vault().active_collection().unwrap(), "setA");

    assert_eq!(h.controller.crawl().await, CrawlState::Done);
    assert_eq!(h.controller.vault().count("setA").unwrap(), 1);
    assert_eq!(h.controller.vault().count("quizletData").unwrap(), 0);

    // Switching back shows the question as new again.
    h.controller.select_collection("quizletData").await.unwrap();
    assert_eq!(h.controller.check().await, CrawlState::Ready);
}

#[tokio::test]
async fn test_page_change_is_picked_up() {
    let h = harness(Config::default(), question_page());
    h.controller.crawl().await;

    h.page.set(PageContent::with_prompt("Another question").choice("A", "A. x"));
    assert_eq!(h.controller.check().await, CrawlState::Ready);
}

// ============================================================================
// Delivery Failures
// ============================================================================

#[tokio::test]
async fn test_dropped_page_surfaces_as_error_state() {
    let Harness {
        agent, controller, ..
    } = harness(Config::default(), question_page());
    drop(agent);

    assert_eq!(controller.title().await, QuestionTitle::Unavailable);
    assert_eq!(controller.check().await, CrawlState::Failed);
    assert_eq!(controller.crawl().await, CrawlState::Retry);

    let err = controller.sync_discussion_links().await.unwrap_err();
    assert!(matches!(
        err,
        VaultError::Delivery(DeliveryError::Unreachable(_))
    ));
}

/// A transport whose page never answers.
struct SilentTransport;

#[async_trait]
impl PageTransport for SilentTransport {
    async fn send(&self, _request: Request) -> Result<Response> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Response::TempData(None))
    }
}

#[tokio::test]
async fn test_delivery_timeout() {
    let config = Config {
        delivery_timeout: Some(Duration::from_millis(20)),
        auto_advance: true,
        ..Default::default()
    };
    let vault = Arc::new(QuizVault::in_memory(config).unwrap());
    let controller = Controller::new(vault, SilentTransport);

    assert_eq!(controller.crawl().await, CrawlState::Retry);

    let err = controller.advance("SAA-C03").await.unwrap_err();
    assert!(matches!(err, VaultError::Delivery(DeliveryError::Timeout(_))));
}

/// A transport that answers every request with the wrong reply kind.
struct ConfusedTransport;

#[async_trait]
impl PageTransport for ConfusedTransport {
    async fn send(&self, _request: Request) -> Result<Response> {
        Ok(Response::DiscussionLinks(Vec::new()))
    }
}

#[tokio::test]
async fn test_unexpected_reply_is_error_state() {
    let vault = Arc::new(QuizVault::in_memory(Config::default()).unwrap());
    let controller = Controller::new(vault, ConfusedTransport);

    assert_eq!(controller.check().await, CrawlState::Failed);
    assert_eq!(controller.title().await, QuestionTitle::Unavailable);
}

// ============================================================================
// Title / Advance
// ============================================================================

#[tokio::test]
async fn test_title_from_header() {
    let h = harness(Config::default(), question_page());
    assert_eq!(
        h.controller.title().await,
        QuestionTitle::Current("Question #: 41".into())
    );
}

#[tokio::test]
async fn test_advance_disabled_by_default() {
    let h = harness(Config::default(), question_page());

    assert_eq!(
        h.controller.advance("SAA-C03").await.unwrap(),
        AdvanceOutcome::Disabled
    );
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn test_advance_requests_next_question() {
    let h = harness(Config::with_auto_advance(), question_page());

    let outcome = h.controller.advance("SAA-C03").await.unwrap();
    assert_eq!(
        outcome,
        AdvanceOutcome::Requested {
            search_key: "SAA-C03 question 42 discussion".into(),
            navigated: true,
        }
    );

    let visited = h.navigator.visited();
    assert_eq!(visited.len(), 1);
    assert_eq!(visited[0].host_str(), Some("www.google.com"));
    let (_, q) = visited[0].query_pairs().next().unwrap();
    assert_eq!(q, "site:examtopics.com SAA-C03 question 42 discussion");
}

#[tokio::test]
async fn test_advance_without_header() {
    let h = harness(
        Config::with_auto_advance(),
        PageContent::with_prompt("Q").choice("A", "A. x"),
    );

    assert_eq!(
        h.controller.advance("SAA-C03").await.unwrap(),
        AdvanceOutcome::NoQuestion
    );
}

// ============================================================================
// Collections / Export / Links
// ============================================================================

#[tokio::test]
async fn test_delete_default_through_controller() {
    let h = harness(Config::default(), question_page());
    let err = h.controller.delete_collection("quizletData").await.unwrap_err();
    assert!(err.is_protected());
}

#[tokio::test]
async fn test_export_active_collection() {
    let out = tempdir().unwrap();
    let h = harness(Config::default(), question_page());

    assert!(h.controller.export_to(out.path()).await.unwrap().is_none());

    h.controller.crawl().await;
    let path = h.controller.export_to(out.path()).await.unwrap().unwrap();
    assert_eq!(path, out.path().join("quizletData.txt"));
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "Which service stores objects?\nA. S3\nB. EC2\n-------------------\nA\n==================="
    );
}

#[tokio::test]
async fn test_sync_discussion_links() {
    let mut page = question_page();
    page.discussion_links = vec![
        DiscussionLink::new(
            "  Exam SAA-C03 topic 1 question 1 ",
            "https://www.examtopics.com/discussions/1",
        ),
        DiscussionLink::new(
            "Exam SAA-C03 topic 1 question 2",
            "https://www.examtopics.com/discussions/2",
        ),
    ];
    let h = harness(Config::default(), page);

    assert_eq!(h.controller.sync_discussion_links().await.unwrap(), 2);

    let links = h.controller.vault().discussion_links().unwrap();
    assert_eq!(links[0].text, "Exam SAA-C03 topic 1 question 1");
    assert_eq!(links[1].href, "https://www.examtopics.com/discussions/2");
}

#[tokio::test]
async fn test_refresh_view() {
    let h = harness(Config::default(), question_page());
    h.controller.add_collection("setA").await.unwrap();

    let view = h.controller.refresh().await.unwrap();
    assert_eq!(view.collections, vec!["quizletData", "setA"]);
    assert_eq!(view.active, "setA");
    assert_eq!(view.count, 0);
    assert_eq!(view.title, QuestionTitle::Current("Question #: 41".into()));
    assert_eq!(view.crawl, CrawlState::Ready);
    assert!(view.crawl.is_enabled());
}
