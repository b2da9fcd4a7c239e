//! Case feed: filter specification, the filter/sort pipeline and the paged
//! view the case-browsing screen drives.

mod engine;
mod filter;
mod view;

pub use engine::apply;
pub(crate) use filter::category_matches;
pub use filter::{FilterSpecification, SortBy};
pub use view::{FeedStats, FeedView, LoadOutcome};
