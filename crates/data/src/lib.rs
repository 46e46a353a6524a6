//! Kairos Data
//!
//! Validation of caller-supplied bar data before any indicator scan starts.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Data-layer error types.
pub mod error;
/// Ordering and value validation helpers.
pub mod validation;

/// Re-export: data-layer error type.
pub use error::DataError;
/// Re-export: row-oriented bar validation.
pub use validation::validate_candles;
/// Re-export: ordering index validation.
pub use validation::validate_index;
/// Re-export: columnar bar series validation.
pub use validation::validate_series;
/// Re-export: validation summary.
pub use validation::ValidationStats;
