//! Reqwest-backed case repository adapter.
//!
//! Every call carries the stored bearer token when one exists. Listing
//! parameters that are absent from the [`CaseQuery`] are omitted from the
//! query string rather than sent empty.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};

use super::client::{ApiClient, ApiFailure, decode};
use super::dto::{DonationRequestDto, FavoriteResponseDto};
use crate::domain::ports::{CaseQuery, CaseRepository, CaseRepositoryError, TokenStore};
use crate::domain::{CaseId, Donation, DonationCase, DonationReceipt};

/// Case repository calling `/cases`, `/cases/{id}`, `/donations` and
/// `/cases/{id}/favorite`.
#[derive(Clone)]
pub struct HttpCaseRepository {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
}

impl HttpCaseRepository {
    /// Repository authorising requests with the credential in `store`.
    pub fn new(client: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self { client, store }
    }

    fn cases_url(&self, query: &CaseQuery) -> Url {
        let mut url = self.client.endpoint(&["cases"]);
        append_query(&mut url, query);
        url
    }

    async fn call(&self, method: Method, url: Url) -> Result<Vec<u8>, ApiFailure> {
        let credential = self.store.get();
        let request = self.client.request(method, url, credential.as_ref());
        self.client.send(request).await
    }
}

fn append_query(url: &mut Url, query: &CaseQuery) {
    {
        let mut pairs = url.query_pairs_mut();
        if let Some(category) = query.category.as_deref() {
            pairs.append_pair("category", category);
        }
        if let Some(urgency) = query.urgency {
            pairs.append_pair("urgency", urgency.as_str());
        }
        if query.verified_only {
            pairs.append_pair("verified", "true");
        }
    }
    if let Some(page) = query.page {
        page.append_to(url);
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
}

fn map_failure(failure: ApiFailure) -> CaseRepositoryError {
    match failure {
        ApiFailure::Transport(message) => CaseRepositoryError::transport(message),
        ApiFailure::Status { status, message } => {
            CaseRepositoryError::rejected(status.as_u16(), message.unwrap_or_default())
        }
    }
}

fn map_lookup_failure(id: &CaseId, failure: ApiFailure) -> CaseRepositoryError {
    match failure {
        ApiFailure::Status {
            status: StatusCode::NOT_FOUND,
            ..
        } => CaseRepositoryError::not_found(id.to_string()),
        other => map_failure(other),
    }
}

#[async_trait]
impl CaseRepository for HttpCaseRepository {
    async fn list_cases(&self, query: &CaseQuery) -> Result<Vec<DonationCase>, CaseRepositoryError> {
        let body = self
            .call(Method::GET, self.cases_url(query))
            .await
            .map_err(map_failure)?;
        decode(&body).map_err(CaseRepositoryError::decode)
    }

    async fn find_case(&self, id: &CaseId) -> Result<DonationCase, CaseRepositoryError> {
        let url = self.client.endpoint(&["cases", id.as_ref()]);
        let body = self
            .call(Method::GET, url)
            .await
            .map_err(|failure| map_lookup_failure(id, failure))?;
        decode(&body).map_err(CaseRepositoryError::decode)
    }

    async fn create_donation(
        &self,
        donation: &Donation,
    ) -> Result<DonationReceipt, CaseRepositoryError> {
        let credential = self.store.get();
        let request = self
            .client
            .request(
                Method::POST,
                self.client.endpoint(&["donations"]),
                credential.as_ref(),
            )
            .json(&DonationRequestDto::from(donation));
        let body = self.client.send(request).await.map_err(map_failure)?;
        decode(&body).map_err(CaseRepositoryError::decode)
    }

    async fn toggle_favorite(&self, id: &CaseId) -> Result<bool, CaseRepositoryError> {
        let url = self.client.endpoint(&["cases", id.as_ref(), "favorite"]);
        let body = self
            .call(Method::POST, url)
            .await
            .map_err(|failure| map_lookup_failure(id, failure))?;
        decode::<FavoriteResponseDto>(&body)
            .map(|dto| dto.is_favorite)
            .map_err(CaseRepositoryError::decode)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for query building and failure mapping.

    use super::*;
    use crate::domain::Urgency;
    use crate::domain::ports::InMemoryTokenStore;
    use pagination::PageRequest;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    #[fixture]
    fn repository() -> HttpCaseRepository {
        let client = ApiClient::new(
            Url::parse("http://localhost:8080").expect("url"),
            Duration::from_secs(5),
        )
        .expect("client");
        HttpCaseRepository::new(client, Arc::new(InMemoryTokenStore::default()))
    }

    #[rstest]
    fn unfiltered_listing_has_no_query_string(repository: HttpCaseRepository) {
        let url = repository.cases_url(&CaseQuery::default());
        assert_eq!(url.as_str(), "http://localhost:8080/cases");
    }

    #[rstest]
    fn active_parameters_are_sent_in_a_stable_order(repository: HttpCaseRepository) {
        let query = CaseQuery {
            category: Some("Health & Care".to_owned()),
            urgency: Some(Urgency::High),
            verified_only: true,
            page: Some(PageRequest::new(12, 24).expect("window")),
        };
        assert_eq!(
            repository.cases_url(&query).query(),
            Some("category=Health+%26+Care&urgency=high&verified=true&limit=12&offset=24")
        );
    }

    #[rstest]
    fn unverified_filter_is_omitted_rather_than_sent_false(repository: HttpCaseRepository) {
        let query = CaseQuery::page(PageRequest::first(6).expect("window"));
        assert_eq!(repository.cases_url(&query).query(), Some("limit=6&offset=0"));
    }

    #[rstest]
    #[case(StatusCode::NOT_FOUND, CaseRepositoryError::not_found("7"))]
    #[case(StatusCode::FORBIDDEN, CaseRepositoryError::rejected(403_u16, "no access"))]
    fn lookups_distinguish_missing_cases(
        #[case] status: StatusCode,
        #[case] expected: CaseRepositoryError,
    ) {
        let id = CaseId::new("7").expect("id");
        let failure = ApiFailure::Status {
            status,
            message: Some("no access".to_owned()),
        };
        assert_eq!(map_lookup_failure(&id, failure), expected);
    }

    #[rstest]
    fn transport_failures_stay_transport() {
        assert_eq!(
            map_failure(ApiFailure::Transport("connection refused".to_owned())),
            CaseRepositoryError::transport("connection refused")
        );
    }
}
