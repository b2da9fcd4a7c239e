//! Tests for the paged feed view.

use std::time::Duration;

use async_trait::async_trait;
use mockall::Sequence;
use rstest::{fixture, rstest};
use tokio::sync::Notify;

use super::*;
use crate::domain::ports::{
    CaseRepositoryError, FixtureCaseRepository, MockCaseRepository, sample_cases,
};
use crate::domain::{Donation, DonationReceipt};

fn case(id: &str) -> DonationCase {
    DonationCase::builder(CaseId::new(id).expect("id"), id).build()
}

fn ids(cases: &[DonationCase]) -> Vec<String> {
    cases.iter().map(|case| case.id().to_string()).collect()
}

fn at_offset(offset: u64) -> impl Fn(&CaseQuery) -> bool + Send + 'static {
    move |query: &CaseQuery| query.page.map(PageRequest::offset) == Some(offset)
}

#[fixture]
fn fixture_feed() -> FeedView {
    FeedView::new(Arc::new(FixtureCaseRepository::default()), 4).expect("feed")
}

/// Repository whose listing waits until the test releases it.
struct GatedRepository {
    gate: Arc<Notify>,
}

#[async_trait]
impl CaseRepository for GatedRepository {
    async fn list_cases(&self, _query: &CaseQuery) -> Result<Vec<DonationCase>, CaseRepositoryError> {
        self.gate.notified().await;
        Ok(vec![case("gated")])
    }

    async fn find_case(&self, id: &CaseId) -> Result<DonationCase, CaseRepositoryError> {
        Err(CaseRepositoryError::not_found(id.to_string()))
    }

    async fn create_donation(
        &self,
        donation: &Donation,
    ) -> Result<DonationReceipt, CaseRepositoryError> {
        Err(CaseRepositoryError::not_found(donation.case_id().to_string()))
    }

    async fn toggle_favorite(&self, id: &CaseId) -> Result<bool, CaseRepositoryError> {
        Err(CaseRepositoryError::not_found(id.to_string()))
    }
}

#[rstest]
#[tokio::test]
async fn a_short_page_exhausts_the_feed(fixture_feed: FeedView) {
    assert_eq!(fixture_feed.load_more().await, Ok(LoadOutcome::Loaded { added: 4 }));
    assert!(!fixture_feed.is_exhausted());
    assert_eq!(fixture_feed.load_more().await, Ok(LoadOutcome::Loaded { added: 2 }));
    assert!(fixture_feed.is_exhausted());
    assert_eq!(fixture_feed.load_more().await, Ok(LoadOutcome::Exhausted));
    assert_eq!(fixture_feed.loaded().len(), 6);
}

#[rstest]
#[tokio::test]
async fn concurrent_loads_are_single_flight() {
    let gate = Arc::new(Notify::new());
    let feed = FeedView::new(
        Arc::new(GatedRepository {
            gate: Arc::clone(&gate),
        }),
        10,
    )
    .expect("feed");

    let first = feed.load_more();
    tokio::pin!(first);
    assert!(
        tokio::time::timeout(Duration::ZERO, &mut first)
            .await
            .is_err(),
        "first load should be waiting on the gate"
    );
    assert!(feed.is_loading());
    assert_eq!(feed.load_more().await, Ok(LoadOutcome::AlreadyInFlight));
    assert_eq!(feed.refresh().await, Ok(LoadOutcome::AlreadyInFlight));

    gate.notify_one();
    assert_eq!(first.await, Ok(LoadOutcome::Loaded { added: 1 }));
    assert!(!feed.is_loading());
}

#[rstest]
#[tokio::test]
async fn a_cancelled_load_releases_the_flag() {
    let gate = Arc::new(Notify::new());
    let feed = FeedView::new(Arc::new(GatedRepository { gate }), 10).expect("feed");

    let pending = tokio::time::timeout(Duration::from_millis(5), feed.load_more()).await;
    assert!(pending.is_err());
    assert!(!feed.is_loading());
}

#[rstest]
#[tokio::test]
async fn failures_keep_loaded_pages_and_retry_the_same_offset() {
    let mut repository = MockCaseRepository::new();
    let mut seq = Sequence::new();
    repository
        .expect_list_cases()
        .withf(at_offset(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(vec![case("a"), case("b")]));
    repository
        .expect_list_cases()
        .withf(at_offset(2))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Err(CaseRepositoryError::transport("connection reset")));
    repository
        .expect_list_cases()
        .withf(at_offset(2))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(vec![case("c")]));
    let feed = FeedView::new(Arc::new(repository), 2).expect("feed");

    feed.load_more().await.expect("first page");
    let err = feed.load_more().await.expect_err("second page fails");
    assert_eq!(err.code(), ErrorCode::Network);
    assert!(err.is_retryable());
    assert_eq!(feed.last_error(), Some(err));
    assert_eq!(ids(&feed.loaded()), ["a", "b"]);

    assert_eq!(feed.load_more().await, Ok(LoadOutcome::Loaded { added: 1 }));
    assert_eq!(feed.last_error(), None);
    assert_eq!(ids(&feed.loaded()), ["a", "b", "c"]);
    assert!(feed.is_exhausted());
}

#[rstest]
#[tokio::test]
async fn duplicates_across_pages_are_skipped() {
    let mut repository = MockCaseRepository::new();
    repository
        .expect_list_cases()
        .withf(at_offset(0))
        .return_once(|_| Ok(vec![case("a"), case("b")]));
    repository
        .expect_list_cases()
        .withf(at_offset(2))
        .return_once(|_| Ok(vec![case("b"), case("c")]));
    let feed = FeedView::new(Arc::new(repository), 2).expect("feed");

    feed.load_more().await.expect("first page");
    assert_eq!(feed.load_more().await, Ok(LoadOutcome::Loaded { added: 1 }));
    assert_eq!(ids(&feed.loaded()), ["a", "b", "c"]);
}

#[rstest]
#[tokio::test]
async fn refresh_replaces_only_on_success() {
    let mut repository = MockCaseRepository::new();
    let mut seq = Sequence::new();
    repository
        .expect_list_cases()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(vec![case("old")]));
    repository
        .expect_list_cases()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Err(CaseRepositoryError::rejected(500_u16, "")));
    repository
        .expect_list_cases()
        .withf(at_offset(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(vec![case("new")]));
    let feed = FeedView::new(Arc::new(repository), 5).expect("feed");

    feed.load_more().await.expect("initial load");
    let err = feed.refresh().await.expect_err("refresh fails");
    assert_eq!(err.message(), "failed to load cases");
    assert_eq!(ids(&feed.loaded()), ["old"]);

    feed.refresh().await.expect("refresh succeeds");
    assert_eq!(ids(&feed.loaded()), ["new"]);
}

#[rstest]
#[tokio::test]
async fn visible_applies_the_current_filter(fixture_feed: FeedView) {
    fixture_feed.load_more().await.expect("page one");
    fixture_feed.load_more().await.expect("page two");
    fixture_feed.update_filter(|spec| spec.with_category(Some("health")));
    assert_eq!(ids(&fixture_feed.visible()), ["1", "6"]);

    fixture_feed.update_filter(FilterSpecification::cleared);
    assert_eq!(fixture_feed.visible(), fixture_feed.loaded());
}

#[rstest]
#[tokio::test]
async fn optimistic_donations_feed_the_stats(fixture_feed: FeedView) {
    fixture_feed.load_more().await.expect("page one");
    fixture_feed.load_more().await.expect("page two");
    let before = fixture_feed.stats();
    assert_eq!(before.case_count, sample_cases().len());
    assert_eq!(before.verified_count, 5);
    assert_eq!(before.high_urgency_count, 3);
    assert_eq!(before.total_raised, Amount::from_major_units(170_000));

    let id = CaseId::new("3").expect("id");
    assert!(fixture_feed.record_donation(&id, Amount::from_major_units(100)));
    assert!(!fixture_feed.record_donation(&CaseId::new("missing").expect("id"), Amount::from_major_units(1)));
    assert_eq!(
        fixture_feed.stats().total_raised,
        Amount::from_major_units(170_100)
    );
}
