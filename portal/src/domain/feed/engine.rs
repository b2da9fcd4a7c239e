//! Pure filter-then-sort pipeline over a case collection.

use std::cmp::Ordering;

use crate::domain::DonationCase;

use super::{FilterSpecification, SortBy};

/// Filter `cases` by every active predicate of `spec`, then stable-sort.
///
/// Cases with a zero target have no funding ratio; both funding orders put
/// them after every case that has one, in input order.
///
/// # Examples
/// ```
/// use portal::domain::{apply, FilterSpecification};
///
/// assert!(apply(&[], &FilterSpecification::default()).is_empty());
/// ```
pub fn apply(cases: &[DonationCase], spec: &FilterSpecification) -> Vec<DonationCase> {
    let mut view: Vec<DonationCase> = cases
        .iter()
        .filter(|case| spec.matches(case))
        .cloned()
        .collect();
    if let Some(sort_by) = spec.sort_by() {
        view.sort_by(|a, b| compare(sort_by, a, b));
    }
    view
}

fn compare(sort_by: SortBy, a: &DonationCase, b: &DonationCase) -> Ordering {
    match sort_by {
        SortBy::Newest => b.created_at().cmp(&a.created_at()),
        SortBy::EndingSoon => a.days_left().cmp(&b.days_left()),
        SortBy::MostFunded => by_ratio(a, b, |x, y| y.total_cmp(&x)),
        SortBy::LeastFunded => by_ratio(a, b, |x, y| x.total_cmp(&y)),
    }
}

fn by_ratio(
    a: &DonationCase,
    b: &DonationCase,
    defined: impl Fn(f64, f64) -> Ordering,
) -> Ordering {
    match (a.funding_ratio(), b.funding_ratio()) {
        (Some(x), Some(y)) => defined(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
