//! Typed errors for imperative table setters.
//!
//! Derivation itself (filter → group → sort → expand → paginate) never fails;
//! only setters that name a column or a page size can be rejected.

use thiserror::Error;

use crate::column::FilterKind;

/// Convenient alias for table results.
pub type TableResult<T> = Result<T, TableError>;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    /// The column id is not part of this table's column set.
    #[error("[Table View] unknown column: {0}")]
    UnknownColumn(String),

    /// Column declares no filter kind.
    #[error("[Table View] column is not filterable: {0}")]
    NotFilterable(String),

    /// Filter value does not fit the column's declared filter kind.
    #[error("[Table View] filter for column {column} must be {expected:?}")]
    FilterKindMismatch { column: String, expected: FilterKind },

    #[error("[Table View] column is not sortable: {0}")]
    NotSortable(String),

    #[error("[Table View] column is not groupable: {0}")]
    NotGroupable(String),

    /// Page size must be at least 1.
    #[error("[Table View] invalid page size: {0}")]
    InvalidPageSize(usize),

    /// A pagination setter was called on a table built without pagination.
    #[error("[Table View] pagination is disabled for this table")]
    PaginationDisabled,
}
