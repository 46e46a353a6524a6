//! Columnar bar series and aligned output series.

use serde::{Deserialize, Serialize};

use crate::{Candle, CoreError};

/// Aligned indicator output. `None` marks an undefined value (warm-up prefix
/// or a bar where the output does not apply).
pub type Series = Vec<Option<f64>>;

/// Positionally aligned OHLCV columns plus the ordering index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// Ordering index (epoch nanoseconds). Used for validation only.
    pub index: Vec<i64>,
    /// Open prices.
    pub open: Vec<f64>,
    /// High prices.
    pub high: Vec<f64>,
    /// Low prices.
    pub low: Vec<f64>,
    /// Close prices.
    pub close: Vec<f64>,
    /// Volumes.
    #[serde(default)]
    pub volume: Vec<f64>,
}

impl BarSeries {
    /// Builds a series from columns, checking that every column matches the index length.
    ///
    /// An empty `volume` column is accepted and filled with zeros.
    ///
    /// # Errors
    /// Returns [`CoreError::ColumnLength`] when a column is not aligned with `index`.
    pub fn from_columns(
        index: Vec<i64>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<f64>,
    ) -> Result<Self, CoreError> {
        let expected = index.len();
        let volume = if volume.is_empty() {
            vec![0.0; expected]
        } else {
            volume
        };

        for (column, actual) in [
            ("open", open.len()),
            ("high", high.len()),
            ("low", low.len()),
            ("close", close.len()),
            ("volume", volume.len()),
        ] {
            if actual != expected {
                return Err(CoreError::ColumnLength {
                    column,
                    expected,
                    actual,
                });
            }
        }

        Ok(Self {
            index,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Builds columns from row-oriented bars.
    #[must_use]
    pub fn from_candles(candles: &[Candle]) -> Self {
        Self {
            index: candles.iter().map(|c| c.timestamp_ns).collect(),
            open: candles.iter().map(|c| c.open).collect(),
            high: candles.iter().map(|c| c.high).collect(),
            low: candles.iter().map(|c| c.low).collect(),
            close: candles.iter().map(|c| c.close).collect(),
            volume: candles.iter().map(|c| c.volume).collect(),
        }
    }

    /// Converts back to row-oriented bars.
    #[must_use]
    pub fn to_candles(&self) -> Vec<Candle> {
        (0..self.len())
            .map(|i| Candle {
                timestamp_ns: self.index[i],
                open: self.open[i],
                high: self.high[i],
                low: self.low[i],
                close: self.close[i],
                volume: self.volume.get(i).copied().unwrap_or(0.0),
            })
            .collect()
    }

    /// Returns length of the aligned series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true when series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
