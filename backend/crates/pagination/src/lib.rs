//! Offset pagination primitives shared by record collections.
//!
//! A [`Query`] describes which slice of a matching set a caller wants and how
//! to order it. A [`Page`] carries that slice together with the size of the
//! full matching set so clients can render pagination controls from
//! [`Page::total`] rather than from the slice length.
//!
//! # Examples
//! ```
//! use pagination::{Page, Query, SortOrder};
//!
//! let query = Query::default()
//!     .with_limit(2)
//!     .with_sort("timestamp", SortOrder::Desc);
//! assert_eq!(query.expected_len(3), 2);
//!
//! let page = Page::new(vec![30, 20], 3);
//! assert_eq!(page.total, 3);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction applied to a single sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest value first.
    #[default]
    Asc,
    /// Largest value first.
    Desc,
}

/// One field of a multi-field sort, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Dotted document path to sort on.
    pub field: String,
    /// Direction for this field.
    pub order: SortOrder,
}

impl SortField {
    /// Sort on `field` in `order`.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// Errors raised while interpreting a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// `sortBy` and `order` were supplied with different lengths.
    #[error("sortBy has {fields} entries but order has {orders}")]
    SortLengthMismatch {
        /// Number of sort fields supplied.
        fields: usize,
        /// Number of sort directions supplied.
        orders: usize,
    },
}

/// Paging and ordering options for a collection read.
///
/// Serialises with the wire names `limit`, `offset`, `sortBy` and `order`.
/// A `limit` of zero means the page is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    /// Maximum records to return; zero disables the limit.
    pub limit: u64,
    /// Number of matching records to skip before the page starts.
    pub offset: u64,
    /// Fields to sort on, highest priority first.
    pub sort_by: Vec<String>,
    /// Direction for each entry of `sort_by`.
    pub order: Vec<SortOrder>,
}

impl Query {
    /// Set the page size. Zero disables the limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the number of records to skip.
    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Append a sort field with its direction.
    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by.push(field.into());
        self.order.push(order);
        self
    }

    /// The effective page limit, `None` when unbounded.
    #[must_use]
    pub const fn page_limit(&self) -> Option<u64> {
        if self.limit == 0 {
            None
        } else {
            Some(self.limit)
        }
    }

    /// Pair each sort field with its direction.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::SortLengthMismatch`] when `sort_by` and `order`
    /// differ in length. Callers are expected to fall back to an unsorted
    /// read rather than fail the request.
    pub fn sort_fields(&self) -> Result<Vec<SortField>, QueryError> {
        if self.sort_by.len() != self.order.len() {
            return Err(QueryError::SortLengthMismatch {
                fields: self.sort_by.len(),
                orders: self.order.len(),
            });
        }
        Ok(self
            .sort_by
            .iter()
            .zip(&self.order)
            .map(|(field, order)| SortField {
                field: field.clone(),
                order: *order,
            })
            .collect())
    }

    /// Number of records a page holds when `total` records match.
    #[must_use]
    pub fn expected_len(&self, total: u64) -> u64 {
        let remaining = total.saturating_sub(self.offset);
        self.page_limit()
            .map_or(remaining, |limit| remaining.min(limit))
    }
}

/// One page of a collection read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Records in this page, in query order.
    pub records: Vec<T>,
    /// Size of the full matching set, independent of paging.
    pub total: u64,
}

impl<T> Page<T> {
    /// Build a page from its records and the full match count.
    #[must_use]
    pub const fn new(records: Vec<T>, total: u64) -> Self {
        Self { records, total }
    }

    /// Transform every record, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            records: self.records.into_iter().map(f).collect::<Result<_, _>>()?,
            total: self.total,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for query interpretation and page helpers.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, 0, 5, 5)]
    #[case(2, 0, 5, 2)]
    #[case(2, 4, 5, 1)]
    #[case(2, 9, 5, 0)]
    #[case(0, 3, 5, 2)]
    fn expected_len_follows_limit_and_offset(
        #[case] limit: u64,
        #[case] offset: u64,
        #[case] total: u64,
        #[case] expected: u64,
    ) {
        let query = Query::default().with_limit(limit).with_offset(offset);
        assert_eq!(query.expected_len(total), expected);
    }

    #[rstest]
    fn sort_fields_pair_names_with_directions() {
        let query = Query::default()
            .with_sort("timestamp", SortOrder::Desc)
            .with_sort("id", SortOrder::Asc);

        let fields = query.sort_fields().expect("lengths match");
        assert_eq!(
            fields,
            vec![
                SortField {
                    field: "timestamp".to_owned(),
                    order: SortOrder::Desc,
                },
                SortField {
                    field: "id".to_owned(),
                    order: SortOrder::Asc,
                },
            ]
        );
    }

    #[rstest]
    fn sort_fields_reject_mismatched_lengths() {
        let query = Query {
            sort_by: vec!["timestamp".to_owned(), "id".to_owned()],
            order: vec![SortOrder::Desc],
            ..Query::default()
        };

        assert_eq!(
            query.sort_fields(),
            Err(QueryError::SortLengthMismatch {
                fields: 2,
                orders: 1,
            })
        );
    }

    #[rstest]
    fn query_uses_wire_names_and_defaults() {
        let query: Query = serde_json::from_value(json!({
            "limit": 1,
            "sortBy": ["timestamp"],
            "order": ["desc"],
        }))
        .expect("query decodes");

        assert_eq!(query.limit, 1);
        assert_eq!(query.offset, 0);
        assert_eq!(query.sort_by, vec!["timestamp".to_owned()]);
        assert_eq!(query.order, vec![SortOrder::Desc]);
        assert_eq!(Query::default().page_limit(), None);
    }

    #[rstest]
    fn page_try_map_stops_at_first_error() {
        let page = Page::new(vec!["1", "x", "3"], 3);
        let result = page.try_map(str::parse::<u32>);
        assert!(result.is_err());
    }

    #[rstest]
    fn page_try_map_keeps_total() {
        let page = Page::new(vec!["1", "2"], 10).try_map(str::parse::<u32>);
        assert_eq!(page, Ok(Page::new(vec![1, 2], 10)));
    }
}
