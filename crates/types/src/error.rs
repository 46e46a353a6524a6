//! Error types for the core data structures.

use thiserror::Error;

/// Core error types for Kairos
#[derive(Debug, Error)]
pub enum CoreError {
    /// Column length mismatch inside a bar series
    #[error("Column {column} has {actual} values, index has {expected}")]
    ColumnLength {
        /// Offending column name.
        column: &'static str,
        /// Length of the ordering index.
        expected: usize,
        /// Length of the column.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_length_display() {
        let err = CoreError::ColumnLength {
            column: "high",
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Column high has 2 values, index has 3");
    }
}
