//! Data-layer error types.

use thiserror::Error;

/// Errors raised while validating caller-supplied bar data.
#[derive(Debug, Error)]
pub enum DataError {
    /// No bars were supplied.
    #[error("Empty data")]
    EmptyData,

    /// A column is not aligned with the ordering index.
    #[error("Length mismatch: column {column} has {actual} values, expected {expected}")]
    LengthMismatch {
        /// Offending column name.
        column: &'static str,
        /// Expected length (index length).
        expected: usize,
        /// Observed length.
        actual: usize,
    },

    /// The ordering index is not strictly increasing.
    #[error("Non-monotonic index at position {position}: {current} <= {previous}")]
    NonMonotonicIndex {
        /// Position of the offending bar.
        position: usize,
        /// Index value of the previous bar.
        previous: i64,
        /// Index value of the offending bar.
        current: i64,
    },

    /// Data violated a value rule (infinite price, negative volume, inverted range).
    #[error("Corrupt data: {0}")]
    CorruptData(String),
}
