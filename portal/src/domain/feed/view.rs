//! Paged, filterable view over the case feed.
//!
//! `FeedView` owns what the case-browsing screen shows: the cases loaded so
//! far, the current filter, and where the next page starts. Loading is
//! single-flight: a second `load_more` or `refresh` while one is running
//! returns [`LoadOutcome::AlreadyInFlight`] without touching the network.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pagination::{Page, PageRequest, PageRequestError};
use tracing::{debug, warn};

use crate::domain::case_catalogue::map_case_error;
use crate::domain::ports::{CaseQuery, CaseRepository};
use crate::domain::{Amount, CaseId, DonationCase, Error, ErrorCode, Urgency};

use super::{FilterSpecification, apply};

/// Result of a load attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived; `added` new cases joined the collection.
    Loaded {
        /// Cases appended (duplicates already loaded are skipped).
        added: usize,
    },
    /// Another load was running; nothing happened.
    AlreadyInFlight,
    /// The feed has no more pages.
    Exhausted,
}

/// Aggregate figures over the loaded cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    /// Number of loaded cases.
    pub case_count: usize,
    /// Sum of `current_amount` across loaded cases.
    pub total_raised: Amount,
    /// Number of verified cases.
    pub verified_count: usize,
    /// Number of high-urgency cases.
    pub high_urgency_count: usize,
}

impl FeedStats {
    fn over(cases: &[DonationCase]) -> Self {
        Self {
            case_count: cases.len(),
            total_raised: cases
                .iter()
                .fold(Amount::ZERO, |total, case| total.saturating_add(case.current_amount())),
            verified_count: cases.iter().filter(|case| case.is_verified()).count(),
            high_urgency_count: cases
                .iter()
                .filter(|case| case.urgency() == Urgency::High)
                .count(),
        }
    }
}

#[derive(Debug)]
struct FeedState {
    cases: Vec<DonationCase>,
    filter: FilterSpecification,
    next_page: Option<PageRequest>,
    last_error: Option<Error>,
}

/// Clears the in-flight flag when the load finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Stateful feed backed by a [`CaseRepository`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use portal::domain::ports::FixtureCaseRepository;
/// use portal::domain::{FeedView, LoadOutcome};
///
/// let runtime = tokio::runtime::Builder::new_current_thread()
///     .build()
///     .expect("runtime");
/// runtime.block_on(async {
///     let feed = FeedView::new(Arc::new(FixtureCaseRepository::default()), 4).expect("feed");
///     assert_eq!(feed.load_more().await, Ok(LoadOutcome::Loaded { added: 4 }));
///     assert_eq!(feed.load_more().await, Ok(LoadOutcome::Loaded { added: 2 }));
///     assert_eq!(feed.load_more().await, Ok(LoadOutcome::Exhausted));
/// });
/// ```
pub struct FeedView {
    repository: Arc<dyn CaseRepository>,
    first_page: PageRequest,
    loading: AtomicBool,
    state: Mutex<FeedState>,
}

impl FeedView {
    /// Empty feed fetching `page_size` cases per page.
    pub fn new(
        repository: Arc<dyn CaseRepository>,
        page_size: u32,
    ) -> Result<Self, PageRequestError> {
        let first_page = PageRequest::first(page_size)?;
        Ok(Self {
            repository,
            first_page,
            loading: AtomicBool::new(false),
            state: Mutex::new(FeedState {
                cases: Vec::new(),
                filter: FilterSpecification::default(),
                next_page: Some(first_page),
                last_error: None,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self, request: PageRequest) -> Result<Page<DonationCase>, Error> {
        let result = self
            .repository
            .list_cases(&CaseQuery::page(request))
            .await
            .map(|cases| Page::new(request, cases))
            .map_err(|err| map_case_error(err, ErrorCode::Fetch, "failed to load cases"));
        if let Err(err) = &result {
            warn!(offset = request.offset(), error = %err, "feed page load failed");
            self.state().last_error = Some(err.clone());
        }
        result
    }

    /// Append the next page.
    ///
    /// On failure the loaded cases and the page cursor are left as they
    /// were, so calling again retries the same page.
    pub async fn load_more(&self) -> Result<LoadOutcome, Error> {
        let Some(_guard) = InFlight::acquire(&self.loading) else {
            debug!("feed load already in flight");
            return Ok(LoadOutcome::AlreadyInFlight);
        };
        let Some(request) = self.state().next_page else {
            return Ok(LoadOutcome::Exhausted);
        };
        let page = self.fetch(request).await?;
        let received = page.items().len();
        let next_page = page.next_request();

        let mut state = self.state();
        let known: HashSet<CaseId> = state.cases.iter().map(|case| case.id().clone()).collect();
        let before = state.cases.len();
        state
            .cases
            .extend(page.into_items().into_iter().filter(|case| !known.contains(case.id())));
        let added = state.cases.len() - before;
        state.next_page = next_page;
        state.last_error = None;
        debug!(offset = request.offset(), received, added, "feed page loaded");
        Ok(LoadOutcome::Loaded { added })
    }

    /// Reload from the first page.
    ///
    /// The collection is replaced only when the first page arrives; a
    /// failed refresh keeps what was already loaded.
    pub async fn refresh(&self) -> Result<LoadOutcome, Error> {
        let Some(_guard) = InFlight::acquire(&self.loading) else {
            return Ok(LoadOutcome::AlreadyInFlight);
        };
        let page = self.fetch(self.first_page).await?;
        let next_page = page.next_request();
        let cases = page.into_items();
        let received = cases.len();

        let mut state = self.state();
        state.cases = cases;
        state.next_page = next_page;
        state.last_error = None;
        Ok(LoadOutcome::Loaded { added: received })
    }

    /// Whether a load is running.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Whether the last page has been seen.
    pub fn is_exhausted(&self) -> bool {
        self.state().next_page.is_none()
    }

    /// Error from the most recent failed load, cleared by the next success.
    pub fn last_error(&self) -> Option<Error> {
        self.state().last_error.clone()
    }

    /// Current filter.
    pub fn filter(&self) -> FilterSpecification {
        self.state().filter.clone()
    }

    /// Replace the filter.
    pub fn set_filter(&self, filter: FilterSpecification) {
        self.state().filter = filter;
    }

    /// Derive the next filter from the current one.
    pub fn update_filter(&self, change: impl FnOnce(&FilterSpecification) -> FilterSpecification) {
        let mut state = self.state();
        state.filter = change(&state.filter);
    }

    /// Every loaded case in load order.
    pub fn loaded(&self) -> Vec<DonationCase> {
        self.state().cases.clone()
    }

    /// Loaded cases after filtering and sorting.
    pub fn visible(&self) -> Vec<DonationCase> {
        let state = self.state();
        apply(&state.cases, &state.filter)
    }

    /// Apply an accepted donation to the loaded copy of a case.
    ///
    /// Returns `false` when the case is not loaded.
    pub fn record_donation(&self, case_id: &CaseId, amount: Amount) -> bool {
        let mut state = self.state();
        match state.cases.iter_mut().find(|case| case.id() == case_id) {
            Some(case) => {
                case.record_donation(amount);
                true
            }
            None => false,
        }
    }

    /// Aggregate figures over the loaded cases.
    pub fn stats(&self) -> FeedStats {
        FeedStats::over(&self.state().cases)
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
