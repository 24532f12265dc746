//! Crate-wide error hierarchy for audit-aggregator.
//!
//! The aggregation pipeline itself is infallible: absent reports, audits,
//! details or URLs are represented as empty collections or null scores.
//! Errors only arise while loading configuration.
//!
//! All messages include the prefix `[Audit Aggregator]` to simplify
//! attribution in logs.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// Root error type for the audit-aggregator crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AggregatorError {
    /// Configuration problems (bad numbers, unknown policy names, etc.).
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A number failed to parse (page size, limits).
    #[error("[Audit Aggregator] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `AUDIT_PAGE_SIZE`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected usize`).
        reason: &'static str,
    },

    /// Value is not one of the accepted spellings.
    #[error("[Audit Aggregator] invalid value in {var}: {value:?} (expected {expected})")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[Audit Aggregator] {field} is out of range: {detail}")]
    OutOfRange {
        field: &'static str,
        detail: &'static str,
    },
}
