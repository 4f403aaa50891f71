//! List request validation and pagination metadata.
//!
//! A [`PageRequest`] can only be built from validated [`Filters`], and its sort
//! column is always one of the `&'static str` safelist entries, so no caller
//! supplied text ever reaches query construction.

use classroom_core::validator::permitted_value;
use classroom_core::{AppResult, Validator};
use serde::Serialize;

/// Default page when the caller supplies none.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size when the caller supplies none.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest accepted page number.
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort direction derived from the sort key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (bare key).
    Asc,
    /// Descending order (`-` prefixed key).
    Desc,
}

impl SortDirection {
    /// Returns the SQL keyword for this direction.
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Safelisted sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    column: &'static str,
    direction: SortDirection,
}

impl SortKey {
    /// Returns the column name taken from the safelist.
    #[must_use]
    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Returns the sort direction.
    #[must_use]
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Raw list parameters for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    /// Requested page, 1-based.
    pub page: i64,
    /// Requested page size.
    pub page_size: i64,
    /// Requested sort key, `-` prefixed for descending.
    pub sort: String,
    /// Sort keys accepted for the resource.
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Creates filters with default paging sorted by ascending id.
    #[must_use]
    pub fn new(sort_safelist: &'static [&'static str]) -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: "id".to_owned(),
            sort_safelist,
        }
    }

    /// Validates the filters and builds a page request.
    pub fn page_request(&self) -> AppResult<PageRequest> {
        self.checked_page_request(Validator::new())
    }

    /// Validates the filters on top of failures already recorded by the
    /// caller (for example unparsable query parameters) and builds a page
    /// request when everything passed.
    pub fn checked_page_request(&self, mut validator: Validator) -> AppResult<PageRequest> {
        validate_filters(&mut validator, self);
        validator.finish()?;

        let sort = self.sort_key().ok_or_else(|| {
            classroom_core::AppError::Internal(format!("unsafe sort parameter '{}'", self.sort))
        })?;

        Ok(PageRequest {
            page: u32::try_from(self.page).unwrap_or(1),
            page_size: u32::try_from(self.page_size).unwrap_or(1),
            sort,
        })
    }

    fn sort_key(&self) -> Option<SortKey> {
        let entry = self
            .sort_safelist
            .iter()
            .copied()
            .find(|entry| *entry == self.sort)?;

        Some(match entry.strip_prefix('-') {
            Some(column) => SortKey {
                column,
                direction: SortDirection::Desc,
            },
            None => SortKey {
                column: entry,
                direction: SortDirection::Asc,
            },
        })
    }
}

/// Records paging and sort failures under `page`, `page_size` and `sort`.
pub fn validate_filters(validator: &mut Validator, filters: &Filters) {
    validator.check(filters.page > 0, "page", "must be greater than zero");
    validator.check(
        filters.page <= MAX_PAGE,
        "page",
        "must be a maximum of 10 million",
    );
    validator.check(
        filters.page_size > 0,
        "page_size",
        "must be greater than zero",
    );
    validator.check(
        filters.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    validator.check(
        permitted_value(&filters.sort.as_str(), filters.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

/// Validated, bounded page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
    sort: SortKey,
}

impl PageRequest {
    /// Returns the 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the safelisted sort key.
    #[must_use]
    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Returns the row limit for the page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Returns the number of rows preceding the page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }
}

/// Pagination details returned next to list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Requested page.
    pub current_page: u64,
    /// Requested page size.
    pub page_size: u64,
    /// Always 1.
    pub first_page: u64,
    /// Last page holding records, 0 when nothing matched.
    pub last_page: u64,
    /// Number of records matching the filter across all pages.
    pub total_records: u64,
}

impl Metadata {
    /// Derives metadata from the total match count and the page request.
    #[must_use]
    pub fn calculate(total_records: u64, page: &PageRequest) -> Self {
        let page_size = u64::from(page.page_size.max(1));
        let last_page = if total_records == 0 {
            0
        } else {
            total_records.div_ceil(page_size)
        };

        Self {
            current_page: u64::from(page.page),
            page_size,
            first_page: 1,
            last_page,
            total_records,
        }
    }
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on the page in sort order.
    pub items: Vec<T>,
    /// Pagination details.
    pub metadata: Metadata,
}
