//! Currency amounts in integer minor units.
//!
//! The API exchanges amounts as JSON numbers in major units (`500`,
//! `12.5`). Arithmetic on the client happens in cents so optimistic updates
//! never accumulate floating point drift.

use std::fmt;

use serde::{Deserialize, Serialize};

const MINOR_PER_MAJOR: u64 = 100;
const MINOR_PER_MAJOR_F64: f64 = 100.0;
/// Largest cent count that survives a round trip through `f64`.
const MAX_MINOR: u64 = (1 << 53) - 1;
const MAX_MINOR_F64: f64 = 9_007_199_254_740_991.0;

/// Validation errors returned by [`Amount::try_from_major`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountValidationError {
    /// NaN or infinite input.
    #[error("amount must be a finite number")]
    NotFinite,
    /// Negative input.
    #[error("amount must not be negative")]
    Negative,
    /// Input beyond the representable range.
    #[error("amount is too large")]
    TooLarge,
}

/// Non-negative currency amount held in cents.
///
/// # Examples
/// ```
/// use portal::domain::Amount;
///
/// let amount = Amount::try_from_major(12.5).expect("valid amount");
/// assert_eq!(amount.minor_units(), 1250);
/// assert_eq!(amount.to_string(), "12.50");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(u64);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Build from cents.
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Build from whole currency units.
    pub const fn from_major_units(major: u64) -> Self {
        Self(major.saturating_mul(MINOR_PER_MAJOR))
    }

    /// Build from a major-unit number, rounding to the nearest cent.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "cents is finite, non-negative, whole and at most MAX_MINOR when cast"
    )]
    pub fn try_from_major(value: f64) -> Result<Self, AmountValidationError> {
        if !value.is_finite() {
            return Err(AmountValidationError::NotFinite);
        }
        if value < 0.0 {
            return Err(AmountValidationError::Negative);
        }
        let cents = (value * MINOR_PER_MAJOR_F64).round();
        if cents > MAX_MINOR_F64 {
            return Err(AmountValidationError::TooLarge);
        }
        Ok(Self(cents as u64))
    }

    /// Amount in cents.
    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// Amount in major units.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "minor units never exceed 2^53 - 1, so the cast is exact"
    )]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR_F64
    }

    /// Whether the amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Sum that clamps at the largest representable amount.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0).min(MAX_MINOR))
    }

    /// Difference that clamps at zero.
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_PER_MAJOR,
            self.0 % MINOR_PER_MAJOR
        )
    }
}

impl From<Amount> for f64 {
    fn from(value: Amount) -> Self {
        value.to_major()
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_from_major(value)
    }
}
