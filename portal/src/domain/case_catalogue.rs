//! Case lookups and favourites behind the domain error taxonomy.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use tracing::debug;

use super::ports::{CaseQuery, CaseRepository, CaseRepositoryError};
use super::{CaseId, DonationCase, Error, ErrorCode, FilterSpecification};

/// Convert a repository failure into a domain error of kind `code`.
///
/// Boundary rejections keep the boundary's message, falling back to
/// `fallback` when it is blank. Unreachable boundaries are network errors.
pub(crate) fn map_case_error(error: CaseRepositoryError, code: ErrorCode, fallback: &str) -> Error {
    match error {
        CaseRepositoryError::Rejected { message, .. } => {
            Error::from_boundary(code, Some(message), fallback)
        }
        CaseRepositoryError::NotFound { id } => Error::new(code, format!("case {id} not found")),
        CaseRepositoryError::Transport { message } => Error::network(message),
        CaseRepositoryError::Decode { message } => {
            Error::new(code, format!("{fallback}: unreadable response ({message})"))
        }
    }
}

/// Read side of the case catalogue plus the favourite toggle.
#[derive(Clone)]
pub struct CaseCatalogue {
    repository: Arc<dyn CaseRepository>,
}

impl CaseCatalogue {
    /// Wrap a repository adapter.
    pub fn new(repository: Arc<dyn CaseRepository>) -> Self {
        Self { repository }
    }

    /// One page of cases with the predicates of `filter` applied by the
    /// boundary. Ordering is left to the caller.
    pub async fn search(
        &self,
        filter: &FilterSpecification,
        request: PageRequest,
    ) -> Result<Page<DonationCase>, Error> {
        let cases = self
            .repository
            .list_cases(&CaseQuery::from_filter(filter, Some(request)))
            .await
            .map_err(|err| map_case_error(err, ErrorCode::Fetch, "failed to load cases"))?;
        Ok(Page::new(request, cases))
    }

    /// Fetch one case.
    pub async fn find(&self, id: &CaseId) -> Result<DonationCase, Error> {
        self.repository
            .find_case(id)
            .await
            .map_err(|err| map_case_error(err, ErrorCode::Fetch, "failed to load case"))
    }

    /// Flip the favourite flag on a case.
    pub async fn toggle_favorite(&self, id: &CaseId) -> Result<bool, Error> {
        let is_favorite = self
            .repository
            .toggle_favorite(id)
            .await
            .map_err(|err| map_case_error(err, ErrorCode::Fetch, "failed to update favourite"))?;
        debug!(case_id = %id, is_favorite, "favourite toggled");
        Ok(is_favorite)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockCaseRepository;
    use crate::domain::{SortBy, Urgency};
    use rstest::rstest;

    fn case(id: &str) -> DonationCase {
        DonationCase::builder(CaseId::new(id).expect("id"), id).build()
    }

    #[rstest]
    #[case(CaseRepositoryError::rejected(500_u16, "backend down"), ErrorCode::Fetch, "backend down")]
    #[case(CaseRepositoryError::rejected(500_u16, "  "), ErrorCode::Fetch, "failed to load cases")]
    #[case(CaseRepositoryError::transport("connection refused"), ErrorCode::Network, "connection refused")]
    fn repository_errors_map_onto_the_taxonomy(
        #[case] error: CaseRepositoryError,
        #[case] code: ErrorCode,
        #[case] message: &str,
    ) {
        let mapped = map_case_error(error, ErrorCode::Fetch, "failed to load cases");
        assert_eq!(mapped.code(), code);
        assert_eq!(mapped.message(), message);
    }

    #[rstest]
    #[tokio::test]
    async fn search_failures_are_retryable() {
        let mut repository = MockCaseRepository::new();
        repository
            .expect_list_cases()
            .times(1)
            .return_once(|_| Err(CaseRepositoryError::rejected(503_u16, "")));
        let catalogue = CaseCatalogue::new(Arc::new(repository));
        let err = catalogue
            .search(&FilterSpecification::default(), PageRequest::default())
            .await
            .expect_err("listing fails");
        assert!(err.is_retryable());
    }

    #[rstest]
    #[tokio::test]
    async fn search_sends_the_filter_predicates_with_the_window() {
        let filter = FilterSpecification::default()
            .with_category(Some("health"))
            .with_urgency(Some(Urgency::High))
            .with_verified_only(true)
            .with_sort(Some(SortBy::MostFunded));
        let request = PageRequest::new(2, 4).expect("window");
        let mut repository = MockCaseRepository::new();
        repository
            .expect_list_cases()
            .withf(move |query| {
                query.category.as_deref() == Some("health")
                    && query.urgency == Some(Urgency::High)
                    && query.verified_only
                    && query.page == Some(request)
            })
            .times(1)
            .return_once(|_| Ok(vec![case("a"), case("b")]));
        let catalogue = CaseCatalogue::new(Arc::new(repository));

        let page = catalogue.search(&filter, request).await.expect("page");
        assert_eq!(page.items().len(), 2);
        assert_eq!(page.next_request(), Some(request.advance(2)));
    }

    #[rstest]
    #[tokio::test]
    async fn short_pages_end_the_search() {
        let fixture = crate::domain::ports::FixtureCaseRepository::default();
        let catalogue = CaseCatalogue::new(Arc::new(fixture));
        let page = catalogue
            .search(
                &FilterSpecification::default().with_verified_only(true),
                PageRequest::first(12).expect("window"),
            )
            .await
            .expect("page");
        assert!(page.is_last());
        assert!(page.items().iter().all(DonationCase::is_verified));
    }
}
