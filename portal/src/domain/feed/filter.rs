//! Immutable filter and sort specification for the case feed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{DonationCase, Urgency};

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Most recently created first.
    Newest,
    /// Fewest days left first.
    EndingSoon,
    /// Highest funding ratio first.
    MostFunded,
    /// Lowest funding ratio first.
    LeastFunded,
}

impl SortBy {
    /// Wire and CLI spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::EndingSoon => "ending_soon",
            Self::MostFunded => "most_funded",
            Self::LeastFunded => "least_funded",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "newest" => Ok(Self::Newest),
            "ending_soon" => Ok(Self::EndingSoon),
            "most_funded" => Ok(Self::MostFunded),
            "least_funded" => Ok(Self::LeastFunded),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Case-insensitive substring match on the category label.
pub(crate) fn category_matches(case: &DonationCase, needle: &str) -> bool {
    case.category()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

/// The user's current feed filters.
///
/// Values are immutable: every `with_*` call returns a new specification
/// built from `self` plus one changed field. A blank category is the same
/// as no category.
///
/// # Examples
/// ```
/// use portal::domain::{FilterSpecification, SortBy, Urgency};
///
/// let spec = FilterSpecification::default()
///     .with_category(Some("health"))
///     .with_urgency(Some(Urgency::High))
///     .with_sort(Some(SortBy::MostFunded));
/// assert_eq!(spec.active_count(), 3);
/// assert!(spec.cleared().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpecification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    urgency: Option<Urgency>,
    #[serde(default, rename = "verified")]
    verified_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort_by: Option<SortBy>,
}

impl FilterSpecification {
    /// Replace the category needle. An empty needle clears the filter;
    /// any other value is matched exactly as given, whitespace included.
    #[must_use]
    pub fn with_category<S: AsRef<str>>(&self, category: Option<S>) -> Self {
        let category = category
            .map(|value| value.as_ref().to_owned())
            .filter(|value| !value.is_empty());
        Self {
            category,
            ..self.clone()
        }
    }

    /// Replace the urgency filter.
    #[must_use]
    pub fn with_urgency(&self, urgency: Option<Urgency>) -> Self {
        Self {
            urgency,
            ..self.clone()
        }
    }

    /// Toggle the verified-only filter.
    #[must_use]
    pub fn with_verified_only(&self, verified_only: bool) -> Self {
        Self {
            verified_only,
            ..self.clone()
        }
    }

    /// Replace the sort order.
    #[must_use]
    pub fn with_sort(&self, sort_by: Option<SortBy>) -> Self {
        Self {
            sort_by,
            ..self.clone()
        }
    }

    /// Specification with nothing set.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self::default()
    }

    /// Category needle.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Urgency filter.
    pub fn urgency(&self) -> Option<Urgency> {
        self.urgency
    }

    /// Whether only verified cases are kept.
    pub fn verified_only(&self) -> bool {
        self.verified_only
    }

    /// Sort order.
    pub fn sort_by(&self) -> Option<SortBy> {
        self.sort_by
    }

    /// Number of filters and orderings in effect.
    pub fn active_count(&self) -> usize {
        [
            self.category.is_some(),
            self.urgency.is_some(),
            self.verified_only,
            self.sort_by.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Whether nothing is in effect.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Whether `case` passes every active predicate. Sorting is ignored.
    pub fn matches(&self, case: &DonationCase) -> bool {
        self.category
            .as_deref()
            .is_none_or(|needle| category_matches(case, needle))
            && self.urgency.is_none_or(|urgency| case.urgency() == urgency)
            && (!self.verified_only || case.is_verified())
    }
}
