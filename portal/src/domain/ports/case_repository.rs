//! Driven port for reading cases and writing donations and favourites.
//!
//! The HTTP adapter talks to the REST API; [`FixtureCaseRepository`] serves
//! an in-memory catalogue so feed and donation flows can run without one.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pagination::PageRequest;

use crate::domain::feed::category_matches;
use crate::domain::{
    Amount, CaseId, Donation, DonationCase, DonationReceipt, FilterSpecification, Timestamp,
    Urgency,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by case repository adapters.
    pub enum CaseRepositoryError {
        /// The boundary answered but refused the request. `message` is the
        /// boundary-supplied text and may be blank.
        Rejected { status: u16, message: String } =>
            "case boundary rejected the request ({status}): {message}",
        /// The requested case does not exist.
        NotFound { id: String } => "case {id} not found",
        /// The boundary could not be reached.
        Transport { message: String } => "case boundary unreachable: {message}",
        /// The boundary answered with a payload that could not be read.
        Decode { message: String } => "case boundary response unreadable: {message}",
    }
}

/// Server-side listing parameters. Absent values are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseQuery {
    /// Category substring.
    pub category: Option<String>,
    /// Exact urgency.
    pub urgency: Option<Urgency>,
    /// Only verified cases when `true`.
    pub verified_only: bool,
    /// Page window; `None` asks for everything.
    pub page: Option<PageRequest>,
}

impl CaseQuery {
    /// Unfiltered query for one page.
    pub fn page(request: PageRequest) -> Self {
        Self {
            page: Some(request),
            ..Self::default()
        }
    }

    /// Query carrying the predicates of `spec`. Sorting stays client-side.
    pub fn from_filter(spec: &FilterSpecification, page: Option<PageRequest>) -> Self {
        Self {
            category: spec.category().map(str::to_owned),
            urgency: spec.urgency(),
            verified_only: spec.verified_only(),
            page,
        }
    }

    /// Whether `case` satisfies the predicates of this query.
    pub fn matches(&self, case: &DonationCase) -> bool {
        self.category
            .as_deref()
            .is_none_or(|needle| category_matches(case, needle))
            && self.urgency.is_none_or(|urgency| case.urgency() == urgency)
            && (!self.verified_only || case.is_verified())
    }
}

/// Port for the case catalogue and the writes that hang off it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// List cases matching `query`, in server order.
    async fn list_cases(&self, query: &CaseQuery) -> Result<Vec<DonationCase>, CaseRepositoryError>;

    /// Fetch one case.
    async fn find_case(&self, id: &CaseId) -> Result<DonationCase, CaseRepositoryError>;

    /// Submit a donation.
    async fn create_donation(
        &self,
        donation: &Donation,
    ) -> Result<DonationReceipt, CaseRepositoryError>;

    /// Flip the caller's favourite flag on a case and return the new value.
    async fn toggle_favorite(&self, id: &CaseId) -> Result<bool, CaseRepositoryError>;
}

#[derive(Debug, Default)]
struct FixtureCatalogue {
    cases: Vec<DonationCase>,
    favorites: HashSet<CaseId>,
    receipts: u64,
}

/// In-memory catalogue for tests and offline runs.
///
/// Donations are applied to the stored case so later reads observe them.
#[derive(Debug)]
pub struct FixtureCaseRepository {
    catalogue: Mutex<FixtureCatalogue>,
}

impl FixtureCaseRepository {
    /// Repository serving exactly `cases`.
    pub fn with_cases(cases: Vec<DonationCase>) -> Self {
        Self {
            catalogue: Mutex::new(FixtureCatalogue {
                cases,
                ..FixtureCatalogue::default()
            }),
        }
    }
}

impl Default for FixtureCaseRepository {
    /// Repository seeded with six sample cases.
    fn default() -> Self {
        Self::with_cases(sample_cases())
    }
}

fn window<T: Clone>(items: &[T], page: Option<PageRequest>) -> Vec<T> {
    let Some(page) = page else {
        return items.to_vec();
    };
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl CaseRepository for FixtureCaseRepository {
    async fn list_cases(&self, query: &CaseQuery) -> Result<Vec<DonationCase>, CaseRepositoryError> {
        let catalogue = self.catalogue.lock().unwrap_or_else(PoisonError::into_inner);
        let matching: Vec<DonationCase> = catalogue
            .cases
            .iter()
            .filter(|case| query.matches(case))
            .cloned()
            .collect();
        Ok(window(&matching, query.page))
    }

    async fn find_case(&self, id: &CaseId) -> Result<DonationCase, CaseRepositoryError> {
        let catalogue = self.catalogue.lock().unwrap_or_else(PoisonError::into_inner);
        catalogue
            .cases
            .iter()
            .find(|case| case.id() == id)
            .cloned()
            .ok_or_else(|| CaseRepositoryError::not_found(id.to_string()))
    }

    async fn create_donation(
        &self,
        donation: &Donation,
    ) -> Result<DonationReceipt, CaseRepositoryError> {
        let mut catalogue = self.catalogue.lock().unwrap_or_else(PoisonError::into_inner);
        let case = catalogue
            .cases
            .iter_mut()
            .find(|case| case.id() == donation.case_id())
            .ok_or_else(|| CaseRepositoryError::not_found(donation.case_id().to_string()))?;
        case.record_donation(donation.amount());
        catalogue.receipts += 1;
        Ok(DonationReceipt {
            id: Some(format!("fixture-donation-{}", catalogue.receipts)),
            case_id: donation.case_id().clone(),
            amount: donation.amount(),
            message: donation.message().map(|message| message.as_ref().to_owned()),
        })
    }

    async fn toggle_favorite(&self, id: &CaseId) -> Result<bool, CaseRepositoryError> {
        let mut catalogue = self.catalogue.lock().unwrap_or_else(PoisonError::into_inner);
        if !catalogue.cases.iter().any(|case| case.id() == id) {
            return Err(CaseRepositoryError::not_found(id.to_string()));
        }
        if catalogue.favorites.remove(id) {
            Ok(false)
        } else {
            catalogue.favorites.insert(id.clone());
            Ok(true)
        }
    }
}

struct SampleCase {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    location: &'static str,
    target: u64,
    current: u64,
    days_left: u32,
    image: &'static str,
    beneficiary: &'static str,
    verified: bool,
    urgency: Urgency,
    created: (i32, u32, u32),
    updated: (i32, u32, u32),
}

const SAMPLE_CASES: [SampleCase; 6] = [
    SampleCase {
        id: "1",
        title: "Urgent heart surgery",
        description: "A single mother of two needs urgent cardiac surgery she cannot afford.",
        category: "Health",
        location: "Ciudad de México, MX",
        target: 50_000,
        current: 15_000,
        days_left: 15,
        image: "https://images.unsplash.com/photo-1559757148-5c350d0d3c56?w=400",
        beneficiary: "María González",
        verified: true,
        urgency: Urgency::High,
        created: (2024, 1, 15),
        updated: (2024, 1, 20),
    },
    SampleCase {
        id: "2",
        title: "Rebuild a school damaged by an earthquake",
        description: "Two hundred pupils lost their classrooms and need them rebuilt.",
        category: "Education",
        location: "Puebla, MX",
        target: 75_000,
        current: 45_000,
        days_left: 30,
        image: "https://images.unsplash.com/photo-1580582932707-520aed937b7b?w=400",
        beneficiary: "Escuela Benito Juárez",
        verified: true,
        urgency: Urgency::Medium,
        created: (2024, 1, 10),
        updated: (2024, 1, 19),
    },
    SampleCase {
        id: "3",
        title: "Family left homeless by floods",
        description: "A family lost their home and belongings in recent flooding.",
        category: "Emergency",
        location: "Tabasco, MX",
        target: 30_000,
        current: 8_000,
        days_left: 45,
        image: "https://images.unsplash.com/photo-1547036967-23d11aacaee0?w=400",
        beneficiary: "Familia Ramírez",
        verified: false,
        urgency: Urgency::High,
        created: (2024, 1, 12),
        updated: (2024, 1, 18),
    },
    SampleCase {
        id: "4",
        title: "Community centre for older adults",
        description: "A centre offering recreation and basic medical care for older adults.",
        category: "Community",
        location: "Guadalajara, MX",
        target: 100_000,
        current: 65_000,
        days_left: 60,
        image: "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=400",
        beneficiary: "Asociación de Adultos Mayores",
        verified: true,
        urgency: Urgency::Low,
        created: (2024, 1, 5),
        updated: (2024, 1, 17),
    },
    SampleCase {
        id: "5",
        title: "Reforest a protected natural area",
        description: "Plant one thousand native trees after last year's forest fires.",
        category: "Environment",
        location: "Michoacán, MX",
        target: 25_000,
        current: 12_000,
        days_left: 90,
        image: "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=400",
        beneficiary: "Fundación Verde México",
        verified: true,
        urgency: Urgency::Medium,
        created: (2024, 1, 8),
        updated: (2024, 1, 16),
    },
    SampleCase {
        id: "6",
        title: "Cancer treatment for an eight-year-old",
        description: "An uninsured family needs help paying for chemotherapy.",
        category: "Health",
        location: "Monterrey, MX",
        target: 80_000,
        current: 25_000,
        days_left: 20,
        image: "https://images.unsplash.com/photo-1576091160399-112ba8d25d1f?w=400",
        beneficiary: "Sofía Mendoza",
        verified: true,
        urgency: Urgency::High,
        created: (2024, 1, 14),
        updated: (2024, 1, 19),
    },
];

fn calendar_day((year, month, day): (i32, u32, u32)) -> Timestamp {
    let at = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |midnight| midnight.and_utc());
    Timestamp::new(at)
}

/// The six sample cases served by [`FixtureCaseRepository::default`].
pub fn sample_cases() -> Vec<DonationCase> {
    SAMPLE_CASES
        .iter()
        .filter_map(|sample| {
            let id = CaseId::new(sample.id).ok()?;
            Some(
                DonationCase::builder(id, sample.title)
                    .description(sample.description)
                    .category(sample.category)
                    .location(sample.location)
                    .amounts(
                        Amount::from_major_units(sample.target),
                        Amount::from_major_units(sample.current),
                    )
                    .days_left(sample.days_left)
                    .images(vec![sample.image.to_owned()])
                    .beneficiary_name(sample.beneficiary)
                    .verified(sample.verified)
                    .urgency(sample.urgency)
                    .timestamps(calendar_day(sample.created), calendar_day(sample.updated))
                    .build(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> FixtureCaseRepository {
        FixtureCaseRepository::default()
    }

    fn case_id(raw: &str) -> CaseId {
        CaseId::new(raw).expect("case id")
    }

    #[rstest]
    #[tokio::test]
    async fn pages_slice_the_catalogue(repository: FixtureCaseRepository) {
        let first = PageRequest::first(4).expect("page");
        let page_one = repository
            .list_cases(&CaseQuery::page(first))
            .await
            .expect("page one");
        let page_two = repository
            .list_cases(&CaseQuery::page(first.advance(page_one.len())))
            .await
            .expect("page two");
        assert_eq!(page_one.len(), 4);
        assert_eq!(page_two.len(), 2);
        assert_eq!(page_two[0].id().as_ref(), "5");
    }

    #[rstest]
    #[tokio::test]
    async fn server_side_filters_apply_before_paging(repository: FixtureCaseRepository) {
        let query = CaseQuery {
            urgency: Some(Urgency::High),
            verified_only: true,
            ..CaseQuery::default()
        };
        let cases = repository.list_cases(&query).await.expect("cases");
        let ids: Vec<&str> = cases.iter().map(|case| case.id().as_ref()).collect();
        assert_eq!(ids, ["1", "6"]);
    }

    #[rstest]
    #[tokio::test]
    async fn donations_raise_the_stored_amount(repository: FixtureCaseRepository) {
        let donation = Donation::try_new(case_id("3"), 500.0, Some("fuerza")).expect("donation");
        let receipt = repository.create_donation(&donation).await.expect("receipt");
        assert_eq!(receipt.message.as_deref(), Some("fuerza"));
        let case = repository.find_case(&case_id("3")).await.expect("case");
        assert_eq!(case.current_amount(), Amount::from_major_units(8_500));
    }

    #[rstest]
    #[tokio::test]
    async fn favourites_toggle(repository: FixtureCaseRepository) {
        assert!(repository.toggle_favorite(&case_id("2")).await.expect("on"));
        assert!(!repository.toggle_favorite(&case_id("2")).await.expect("off"));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_cases_are_not_found(repository: FixtureCaseRepository) {
        let err = repository
            .find_case(&case_id("missing"))
            .await
            .expect_err("missing case");
        assert_eq!(err, CaseRepositoryError::not_found("missing"));
    }
}
