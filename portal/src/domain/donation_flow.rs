//! Donation submission state machine.
//!
//! ```text
//! Idle --submit--> Submitting --ok--> Succeeded --acknowledge--> Idle
//!                             \-err-> Failed    --acknowledge--> Idle
//! ```
//!
//! Validation failures leave the flow in `Idle` and never reach the
//! repository.

use std::sync::Arc;

use tracing::{info, warn};

use super::case_catalogue::map_case_error;
use super::ports::CaseRepository;
use super::{Amount, Donation, DonationCase, DonationPreview, Error, ErrorCode, preview};

/// Where a donation attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Ready for a new attempt.
    Idle,
    /// Waiting for the boundary.
    Submitting,
    /// The boundary accepted the donation.
    Succeeded {
        /// Accepted amount.
        amount: Amount,
    },
    /// The attempt failed; the error is what the donor is shown.
    Failed {
        /// Reported failure.
        error: Error,
    },
}

/// Drives a single donation dialogue.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use portal::domain::ports::FixtureCaseRepository;
/// use portal::domain::{DonationFlow, ErrorCode, FlowState};
///
/// let runtime = tokio::runtime::Builder::new_current_thread()
///     .build()
///     .expect("runtime");
/// runtime.block_on(async {
///     let repository = Arc::new(FixtureCaseRepository::default());
///     let case = portal::domain::ports::sample_cases().remove(0);
///     let mut flow = DonationFlow::new(repository);
///     let err = flow.submit(&case, 0.0, None).await.expect_err("zero amount");
///     assert_eq!(err.code(), ErrorCode::Validation);
///     assert_eq!(flow.state(), &FlowState::Idle);
/// });
/// ```
pub struct DonationFlow {
    repository: Arc<dyn CaseRepository>,
    state: FlowState,
}

impl DonationFlow {
    /// Idle flow submitting through `repository`.
    pub fn new(repository: Arc<dyn CaseRepository>) -> Self {
        Self {
            repository,
            state: FlowState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Whether a submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        matches!(self.state, FlowState::Submitting)
    }

    /// Over-remaining check for an amount typed into the dialogue.
    ///
    /// Unrepresentable amounts are a validation error.
    pub fn preview(&self, case: &DonationCase, amount: f64) -> Result<DonationPreview, Error> {
        let amount =
            Amount::try_from_major(amount).map_err(|err| Error::validation(err.to_string()))?;
        Ok(preview(case, amount))
    }

    /// Validate and send a donation for `case`.
    ///
    /// Returns the accepted amount for the caller's optimistic update.
    pub async fn submit(
        &mut self,
        case: &DonationCase,
        amount: f64,
        message: Option<&str>,
    ) -> Result<Amount, Error> {
        if self.state != FlowState::Idle {
            return Err(Error::validation(
                "acknowledge the previous donation outcome before donating again",
            ));
        }
        let donation = Donation::try_new(case.id().clone(), amount, message)
            .map_err(|err| Error::validation(err.to_string()))?;
        if preview(case, donation.amount()).exceeds_remaining() {
            info!(case_id = %case.id(), amount = %donation.amount(), "donation exceeds remaining goal");
        }

        self.state = FlowState::Submitting;
        match self.repository.create_donation(&donation).await {
            Ok(receipt) => {
                info!(
                    case_id = %case.id(),
                    amount = %donation.amount(),
                    receipt = receipt.id.as_deref().unwrap_or("-"),
                    "donation accepted"
                );
                self.state = FlowState::Succeeded {
                    amount: donation.amount(),
                };
                Ok(donation.amount())
            }
            Err(err) => {
                let error = map_case_error(err, ErrorCode::Donation, "failed to process donation");
                warn!(case_id = %case.id(), error = %error, "donation failed");
                self.state = FlowState::Failed {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Return to `Idle` after the donor has seen the outcome.
    ///
    /// Also recovers a flow whose submission was cancelled mid-flight.
    pub fn acknowledge(&mut self) {
        self.state = FlowState::Idle;
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{CaseRepositoryError, MockCaseRepository};
    use crate::domain::{CaseId, DonationReceipt};
    use rstest::{fixture, rstest};

    #[fixture]
    fn open_case() -> DonationCase {
        DonationCase::builder(CaseId::new("c-1").expect("id"), "Case")
            .amounts(Amount::from_major_units(500), Amount::from_major_units(450))
            .days_left(3)
            .build()
    }

    fn receipt_for(donation: &Donation) -> DonationReceipt {
        DonationReceipt {
            id: Some("d-1".to_owned()),
            case_id: donation.case_id().clone(),
            amount: donation.amount(),
            message: None,
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(-10.0)]
    #[case(f64::NAN)]
    #[tokio::test]
    async fn invalid_amounts_never_reach_the_repository(open_case: DonationCase, #[case] amount: f64) {
        let mut repository = MockCaseRepository::new();
        repository.expect_create_donation().never();
        let mut flow = DonationFlow::new(Arc::new(repository));

        let err = flow.submit(&open_case, amount, None).await.expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(flow.state(), &FlowState::Idle);
    }

    #[rstest]
    #[tokio::test]
    async fn success_returns_the_amount_and_sends_the_message(open_case: DonationCase) {
        let mut repository = MockCaseRepository::new();
        repository
            .expect_create_donation()
            .withf(|donation| donation.message().map(ToString::to_string).as_deref() == Some("ánimo"))
            .times(1)
            .returning(|donation| Ok(receipt_for(donation)));
        let mut flow = DonationFlow::new(Arc::new(repository));

        let amount = flow.submit(&open_case, 100.0, Some("ánimo")).await.expect("accepted");
        assert_eq!(amount, Amount::from_major_units(100));
        assert_eq!(flow.state(), &FlowState::Succeeded { amount });
    }

    #[rstest]
    #[tokio::test]
    async fn boundary_message_surfaces_as_donation_error(open_case: DonationCase) {
        let mut repository = MockCaseRepository::new();
        repository
            .expect_create_donation()
            .times(1)
            .returning(|_| Err(CaseRepositoryError::rejected(402_u16, "card declined")));
        let mut flow = DonationFlow::new(Arc::new(repository));

        let err = flow.submit(&open_case, 25.0, None).await.expect_err("declined");
        assert_eq!(err.code(), ErrorCode::Donation);
        assert_eq!(err.message(), "card declined");
        assert_eq!(flow.state(), &FlowState::Failed { error: err });
    }

    #[rstest]
    #[tokio::test]
    async fn terminal_states_must_be_acknowledged(open_case: DonationCase) {
        let mut repository = MockCaseRepository::new();
        repository
            .expect_create_donation()
            .times(2)
            .returning(|donation| Ok(receipt_for(donation)));
        let mut flow = DonationFlow::new(Arc::new(repository));

        flow.submit(&open_case, 10.0, None).await.expect("first");
        let err = flow.submit(&open_case, 10.0, None).await.expect_err("not idle");
        assert_eq!(err.code(), ErrorCode::Validation);

        flow.acknowledge();
        flow.submit(&open_case, 10.0, None).await.expect("after acknowledge");
    }

    #[rstest]
    #[case(100.0, true)]
    #[case(30.0, false)]
    fn preview_flags_amounts_above_remaining(
        open_case: DonationCase,
        #[case] amount: f64,
        #[case] warns: bool,
    ) {
        let flow = DonationFlow::new(Arc::new(MockCaseRepository::new()));
        let preview = flow.preview(&open_case, amount).expect("preview");
        assert_eq!(preview.exceeds_remaining(), warns);
    }
}
