//! Offset/limit page windows for list endpoints.
//!
//! The case listing endpoint pages with plain `limit` and `offset` query
//! parameters. [`PageRequest`] describes one window over that listing and
//! knows how to advance past the items it received; [`Page`] pairs a window
//! with the items the server returned for it.
//!
//! A page that comes back shorter than its limit is the last one. Callers use
//! [`Page::next_request`] to decide whether another fetch is worthwhile.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Page size used when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the number of items to skip.
pub const OFFSET_PARAM: &str = "offset";

/// Errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// A page must hold at least one item.
    #[error("page limit must be greater than zero")]
    ZeroLimit,
    /// The requested page size exceeds [`MAX_PAGE_SIZE`].
    #[error("page limit {requested} exceeds the maximum of {max}")]
    LimitTooLarge {
        /// Requested limit.
        requested: u32,
        /// Maximum accepted limit.
        max: u32,
    },
}

/// One offset/limit window over a listing.
///
/// ## Invariants
/// - `limit` is within `1..=MAX_PAGE_SIZE`.
/// - `offset` only grows as pages are consumed.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let first = PageRequest::first(10).expect("valid limit");
/// let second = first.advance(10);
/// assert_eq!(second.offset(), 10);
/// assert_eq!(second.limit(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl PageRequest {
    /// Build a window starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `limit` is zero or above
    /// [`MAX_PAGE_SIZE`].
    pub const fn new(limit: u32, offset: u64) -> Result<Self, PageRequestError> {
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > MAX_PAGE_SIZE {
            return Err(PageRequestError::LimitTooLarge {
                requested: limit,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { limit, offset })
    }

    /// Build the first window of a listing.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] under the same conditions as
    /// [`PageRequest::new`].
    pub const fn first(limit: u32) -> Result<Self, PageRequestError> {
        Self::new(limit, 0)
    }

    /// Maximum number of items in this window.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Number of items skipped before this window.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }

    /// Window following this one once `received` items have been consumed.
    ///
    /// The offset moves by what the server actually returned, not by the
    /// limit, so a short page never skips records.
    #[must_use]
    pub fn advance(self, received: usize) -> Self {
        let step = u64::try_from(received).unwrap_or(u64::MAX);
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(step),
        }
    }

    /// Whether `received` items mean the listing has no further pages.
    #[must_use]
    pub fn is_final(self, received: usize) -> bool {
        u32::try_from(received).is_ok_and(|count| count < self.limit)
    }

    /// Append `limit` and `offset` query parameters to `url`.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    /// use url::Url;
    ///
    /// let mut url = Url::parse("http://localhost:8080/cases?verified=true").expect("url");
    /// PageRequest::new(12, 24).expect("window").append_to(&mut url);
    /// assert_eq!(url.query(), Some("verified=true&limit=12&offset=24"));
    /// ```
    pub fn append_to(self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair(LIMIT_PARAM, &self.limit.to_string())
            .append_pair(OFFSET_PARAM, &self.offset.to_string());
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Items returned for one [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    request: PageRequest,
    items: Vec<T>,
}

impl<T> Page<T> {
    /// Pair a window with the items fetched for it.
    #[must_use]
    pub const fn new(request: PageRequest, items: Vec<T>) -> Self {
        Self { request, items }
    }

    /// Window this page answers.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Borrow the fetched items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Take ownership of the fetched items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Whether this page ends the listing.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.request.is_final(self.items.len())
    }

    /// Window to fetch next, or `None` when this page ends the listing.
    #[must_use]
    pub fn next_request(&self) -> Option<PageRequest> {
        if self.is_last() {
            None
        } else {
            Some(self.request.advance(self.items.len()))
        }
    }
}
