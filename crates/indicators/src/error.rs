//! Indicator error types.

use thiserror::Error;

/// Errors raised around indicator evaluation.
///
/// The numeric core never fails: invalid parameters are replaced by their
/// defaults, short inputs yield all-undefined outputs and singular divisions
/// are guarded in place. These variants cover the surfaces around it:
/// registry lookup, externally supplied lines and cancellation.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// Unknown indicator name requested from registry
    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    /// Parameters do not match the requested indicator
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Unknown moving-average mode string
    #[error("unknown moving average mode: {0}")]
    UnknownMaMode(String),

    /// Externally supplied lines are not aligned with each other
    #[error("length mismatch: {name} has {actual} values, expected {expected}")]
    LengthMismatch {
        /// Name of the offending input.
        name: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// The scan was cancelled before completion
    #[error("evaluation cancelled at bar {at}")]
    Cancelled {
        /// First bar that was not evaluated.
        at: usize,
    },

    /// Configuration could not be decoded
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl IndicatorError {
    /// Creates an `InvalidParams` error with a message.
    #[must_use]
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        IndicatorError::InvalidParams(msg.into())
    }

    /// Checks that an external line matches the expected length.
    ///
    /// # Errors
    /// Returns [`IndicatorError::LengthMismatch`] when the lengths differ.
    pub fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(IndicatorError::LengthMismatch {
                name,
                expected,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        assert!(IndicatorError::check_len("dar", 3, 3).is_ok());
        let err = IndicatorError::check_len("dar", 3, 2).unwrap_err();
        assert_eq!(err.to_string(), "length mismatch: dar has 2 values, expected 3");
    }

    #[test]
    fn test_cancelled_display() {
        let err = IndicatorError::Cancelled { at: 42 };
        assert_eq!(err.to_string(), "evaluation cancelled at bar 42");
    }
}
