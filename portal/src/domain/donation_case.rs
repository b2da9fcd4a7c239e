//! Fundraising case records.
//!
//! Cases are owned by the case repository. The client only ever changes one
//! field locally: `current_amount` grows after a donation is accepted, ahead
//! of the authoritative value arriving with the next fetch.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Amount;

/// Validation errors for case identifiers and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseValidationError {
    /// Case identifier was blank.
    #[error("case id must not be empty")]
    EmptyId,
    /// Timestamp was neither RFC 3339 nor a calendar date.
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp {
        /// Rejected input.
        value: String,
    },
}

/// Identifier of a donation case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseId(String);

impl CaseId {
    /// Validate and construct a [`CaseId`].
    pub fn new(id: impl Into<String>) -> Result<Self, CaseValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CaseValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for CaseId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CaseId> for String {
    fn from(value: CaseId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CaseId {
    type Error = CaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Point in time attached to a case.
///
/// The API emits either full RFC 3339 timestamps or bare `YYYY-MM-DD` dates;
/// dates are read as midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a UTC instant.
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Parse RFC 3339 or a calendar date.
    pub fn parse(value: &str) -> Result<Self, CaseValidationError> {
        let invalid = || CaseValidationError::InvalidTimestamp {
            value: value.to_owned(),
        };
        if let Ok(at) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self(at.with_timezone(&Utc)));
        }
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        Ok(Self(midnight.and_utc()))
    }

    /// Underlying instant.
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.0.to_rfc3339()
    }
}

impl TryFrom<String> for Timestamp {
    type Error = CaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// How pressing a case is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Normal.
    Low,
    /// Moderate.
    Medium,
    /// Urgent.
    High,
}

impl Urgency {
    /// Wire representation used in query strings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown urgency '{other}'; expected low|medium|high")),
        }
    }
}

/// Fundraising campaign with a goal and progress.
///
/// ## Invariants
/// - `current_amount` never decreases through this type's API.
/// - `target_amount` should be positive; zero targets are tolerated and
///   report no funding ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationCase {
    id: CaseId,
    title: String,
    #[serde(default)]
    description: String,
    category: String,
    #[serde(default)]
    location: String,
    target_amount: Amount,
    current_amount: Amount,
    days_left: u32,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    beneficiary_name: String,
    verified: bool,
    urgency: Urgency,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl DonationCase {
    /// Start building a case; remaining fields take neutral defaults.
    pub fn builder(id: CaseId, title: impl Into<String>) -> DonationCaseBuilder {
        DonationCaseBuilder::new(id, title.into())
    }

    /// Identifier.
    pub fn id(&self) -> &CaseId {
        &self.id
    }

    /// Headline.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Long description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Free-text category label.
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Location label.
    pub fn location(&self) -> &str {
        self.location.as_str()
    }

    /// Funding goal.
    pub fn target_amount(&self) -> Amount {
        self.target_amount
    }

    /// Funds raised so far.
    pub fn current_amount(&self) -> Amount {
        self.current_amount
    }

    /// Days until the campaign closes.
    pub fn days_left(&self) -> u32 {
        self.days_left
    }

    /// Image URIs, cover first.
    pub fn images(&self) -> &[String] {
        self.images.as_slice()
    }

    /// Who receives the funds.
    pub fn beneficiary_name(&self) -> &str {
        self.beneficiary_name.as_str()
    }

    /// Whether the platform verified the case.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Urgency level.
    pub fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last update time.
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Whether the campaign still accepts donations.
    pub fn is_open(&self) -> bool {
        self.days_left > 0
    }

    /// Share of the goal raised, or `None` when the target is zero.
    #[expect(clippy::float_arithmetic, reason = "ratios only order and display cases")]
    pub fn funding_ratio(&self) -> Option<f64> {
        if self.target_amount.is_zero() {
            return None;
        }
        Some(self.current_amount.to_major() / self.target_amount.to_major())
    }

    /// Progress for display, capped at 100 percent.
    #[expect(clippy::float_arithmetic, reason = "display-only percentage")]
    pub fn progress_percent(&self) -> f64 {
        self.funding_ratio()
            .map_or(0.0, |ratio| (ratio * 100.0).min(100.0))
    }

    /// Amount still needed to reach the goal.
    pub fn remaining(&self) -> Amount {
        self.target_amount.saturating_sub(self.current_amount)
    }

    /// Apply an accepted donation to the local copy.
    pub fn record_donation(&mut self, amount: Amount) {
        self.current_amount = self.current_amount.saturating_add(amount);
    }
}

/// Builder for [`DonationCase`] used by fixtures and tests.
#[derive(Debug, Clone)]
pub struct DonationCaseBuilder {
    case: DonationCase,
}

impl DonationCaseBuilder {
    fn new(id: CaseId, title: String) -> Self {
        let epoch = Timestamp::new(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            case: DonationCase {
                id,
                title,
                description: String::new(),
                category: String::new(),
                location: String::new(),
                target_amount: Amount::ZERO,
                current_amount: Amount::ZERO,
                days_left: 0,
                images: Vec::new(),
                beneficiary_name: String::new(),
                verified: false,
                urgency: Urgency::Low,
                created_at: epoch,
                updated_at: epoch,
            },
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.case.description = description.into();
        self
    }

    /// Set the category label.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.case.category = category.into();
        self
    }

    /// Set the location label.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.case.location = location.into();
        self
    }

    /// Set goal and progress.
    pub fn amounts(mut self, target: Amount, current: Amount) -> Self {
        self.case.target_amount = target;
        self.case.current_amount = current;
        self
    }

    /// Set days remaining.
    pub fn days_left(mut self, days_left: u32) -> Self {
        self.case.days_left = days_left;
        self
    }

    /// Set image URIs.
    pub fn images(mut self, images: Vec<String>) -> Self {
        self.case.images = images;
        self
    }

    /// Set the beneficiary.
    pub fn beneficiary_name(mut self, name: impl Into<String>) -> Self {
        self.case.beneficiary_name = name.into();
        self
    }

    /// Set the verification flag.
    pub fn verified(mut self, verified: bool) -> Self {
        self.case.verified = verified;
        self
    }

    /// Set urgency.
    pub fn urgency(mut self, urgency: Urgency) -> Self {
        self.case.urgency = urgency;
        self
    }

    /// Set creation and update times.
    pub fn timestamps(mut self, created_at: Timestamp, updated_at: Timestamp) -> Self {
        self.case.created_at = created_at;
        self.case.updated_at = updated_at;
        self
    }

    /// Finish building.
    pub fn build(self) -> DonationCase {
        self.case
    }
}
