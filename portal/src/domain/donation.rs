//! Donation value types and the pre-submission preview.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, AmountValidationError, CaseId, DonationCase};

/// Longest accepted donation message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Quick-pick amounts offered next to the free-form amount input, in whole
/// currency units.
pub const SUGGESTED_AMOUNTS: [u64; 5] = [100, 250, 500, 1000, 2500];

/// Validation errors raised while building a [`Donation`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DonationValidationError {
    /// Amount was zero.
    #[error("donation amount must be greater than zero")]
    ZeroAmount,
    /// Amount could not be represented.
    #[error("invalid donation amount: {0}")]
    InvalidAmount(#[from] AmountValidationError),
    /// Message exceeded [`MAX_MESSAGE_CHARS`].
    #[error("message must be at most {max} characters (got {actual})")]
    MessageTooLong {
        /// Permitted maximum.
        max: usize,
        /// Submitted length.
        actual: usize,
    },
}

/// Optional note attached to a donation.
///
/// ## Invariants
/// - Not blank.
/// - At most [`MAX_MESSAGE_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonationMessage(String);

impl DonationMessage {
    /// Validate a raw message. Blank input yields `Ok(None)`.
    pub fn parse(raw: &str) -> Result<Option<Self>, DonationValidationError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let actual = raw.chars().count();
        if actual > MAX_MESSAGE_CHARS {
            return Err(DonationValidationError::MessageTooLong {
                max: MAX_MESSAGE_CHARS,
                actual,
            });
        }
        Ok(Some(Self(raw.to_owned())))
    }
}

impl AsRef<str> for DonationMessage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DonationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A donation ready to be sent.
///
/// ## Invariants
/// - `amount` is strictly positive.
///
/// # Examples
/// ```
/// use portal::domain::{CaseId, Donation};
///
/// let case_id = CaseId::new("1").expect("case id");
/// let donation = Donation::try_new(case_id, 250.0, Some("  ")).expect("valid donation");
/// assert_eq!(donation.amount().minor_units(), 25_000);
/// assert!(donation.message().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donation {
    case_id: CaseId,
    amount: Amount,
    message: Option<DonationMessage>,
}

impl Donation {
    /// Validate raw form input.
    pub fn try_new(
        case_id: CaseId,
        amount: f64,
        message: Option<&str>,
    ) -> Result<Self, DonationValidationError> {
        let amount = Amount::try_from_major(amount)?;
        if amount.is_zero() {
            return Err(DonationValidationError::ZeroAmount);
        }
        let message = match message {
            Some(raw) => DonationMessage::parse(raw)?,
            None => None,
        };
        Ok(Self {
            case_id,
            amount,
            message,
        })
    }

    /// Case receiving the donation.
    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    /// Donated amount.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Optional note.
    pub fn message(&self) -> Option<&DonationMessage> {
        self.message.as_ref()
    }
}

/// The boundary's record of an accepted donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt {
    /// Server-assigned identifier, when returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Case that received the donation.
    pub case_id: CaseId,
    /// Accepted amount.
    pub amount: Amount,
    /// Note stored with the donation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What the donor sees before confirming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationPreview {
    /// Amount entered.
    pub amount: Amount,
    /// Remaining balance of the case before this donation.
    pub remaining: Amount,
}

impl DonationPreview {
    /// Whether the amount goes beyond what the case still needs.
    ///
    /// This is advisory; the donation may still be submitted.
    pub fn exceeds_remaining(&self) -> bool {
        self.amount > self.remaining
    }
}

/// Compare a prospective amount against a case's remaining balance.
pub fn preview(case: &DonationCase, amount: Amount) -> DonationPreview {
    DonationPreview {
        amount,
        remaining: case.remaining(),
    }
}
