//! Kairos Types
//!
//! Core data structures shared by the Kairos crates: single bars, columnar
//! bar series, price-source selection and the aligned output series used by
//! every indicator.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod candle;
pub mod error;
pub mod price_source;
pub mod series;

// Re-export main types for convenience
pub use candle::Candle;
pub use error::CoreError;
pub use price_source::{ParsePriceSourceError, PriceSource};
pub use series::{BarSeries, Series};
