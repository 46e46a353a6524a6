use kairos_types::{BarSeries, Candle};

use crate::error::DataError;

/// Summary of a successful validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    /// Number of bars checked.
    pub bars: usize,
    /// Bars carrying at least one missing (NaN) price.
    pub incomplete_bars: usize,
}

/// Validates that an ordering index is strictly increasing.
///
/// # Errors
/// - [`DataError::NonMonotonicIndex`] at the first position that does not advance.
pub fn validate_index(index: &[i64]) -> Result<(), DataError> {
    for (position, pair) in index.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(DataError::NonMonotonicIndex {
                position: position + 1,
                previous: pair[0],
                current: pair[1],
            });
        }
    }
    Ok(())
}

/// Validates row-oriented bars: strictly increasing timestamps, no infinite
/// values, non-negative volume and a consistent high/low range.
///
/// Missing prices (`NaN`) are allowed; they are counted and skipped by the
/// range checks.
///
/// # Errors
/// - [`DataError::EmptyData`] when `candles` is empty.
/// - [`DataError::NonMonotonicIndex`] when timestamps do not strictly increase.
/// - [`DataError::CorruptData`] for infinite values, negative volume or `low > high`.
pub fn validate_candles(candles: &[Candle]) -> Result<ValidationStats, DataError> {
    if candles.is_empty() {
        return Err(DataError::EmptyData);
    }

    let mut incomplete_bars = 0usize;

    for (i, candle) in candles.iter().enumerate() {
        check_bar(
            i,
            [candle.open, candle.high, candle.low, candle.close],
            candle.volume,
        )?;

        if !candle.is_complete() {
            incomplete_bars += 1;
        }

        if i > 0 && candle.timestamp_ns <= candles[i - 1].timestamp_ns {
            return Err(DataError::NonMonotonicIndex {
                position: i,
                previous: candles[i - 1].timestamp_ns,
                current: candle.timestamp_ns,
            });
        }
    }

    Ok(finish(candles.len(), incomplete_bars))
}

/// Validates a columnar series: aligned column lengths plus the same value
/// and ordering rules as [`validate_candles`].
///
/// # Errors
/// - [`DataError::EmptyData`] when the index is empty.
/// - [`DataError::LengthMismatch`] when a column is not aligned with the index.
/// - [`DataError::NonMonotonicIndex`] when the index does not strictly increase.
/// - [`DataError::CorruptData`] for infinite values, negative volume or `low > high`.
pub fn validate_series(series: &BarSeries) -> Result<ValidationStats, DataError> {
    let expected = series.index.len();
    if expected == 0 {
        return Err(DataError::EmptyData);
    }

    for (column, actual) in [
        ("open", series.open.len()),
        ("high", series.high.len()),
        ("low", series.low.len()),
        ("close", series.close.len()),
        ("volume", series.volume.len()),
    ] {
        if actual != expected {
            return Err(DataError::LengthMismatch {
                column,
                expected,
                actual,
            });
        }
    }

    validate_index(&series.index)?;

    let mut incomplete_bars = 0usize;
    for i in 0..expected {
        let prices = [series.open[i], series.high[i], series.low[i], series.close[i]];
        check_bar(i, prices, series.volume[i])?;
        if prices.iter().any(|v| v.is_nan()) {
            incomplete_bars += 1;
        }
    }

    Ok(finish(expected, incomplete_bars))
}

fn check_bar(i: usize, prices: [f64; 4], volume: f64) -> Result<(), DataError> {
    if prices.iter().any(|v| v.is_infinite()) || volume.is_infinite() {
        return Err(DataError::CorruptData(format!(
            "Infinite value at index {i}: prices={prices:?}, volume={volume}"
        )));
    }

    if volume < 0.0 {
        return Err(DataError::CorruptData(format!(
            "Negative volume at index {i}: {volume}"
        )));
    }

    let [_, high, low, _] = prices;
    if high.is_finite() && low.is_finite() && low > high {
        return Err(DataError::CorruptData(format!(
            "Inverted range at index {i}: low={low} > high={high}"
        )));
    }

    Ok(())
}

fn finish(bars: usize, incomplete_bars: usize) -> ValidationStats {
    if incomplete_bars > 0 {
        tracing::warn!(
            "Missing prices detected: {} of {} bars incomplete",
            incomplete_bars,
            bars
        );
    }

    ValidationStats {
        bars,
        incomplete_bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candle(ts: i64, close: f64) -> Candle {
        Candle::new(ts, close, close + 1.0, close - 1.0, close, 10.0)
    }

    #[test]
    fn test_validate_candles_ok() {
        let candles: Vec<Candle> = (0..5).map(|i| make_candle(i, 100.0 + i as f64)).collect();
        let stats = validate_candles(&candles).unwrap();
        assert_eq!(stats.bars, 5);
        assert_eq!(stats.incomplete_bars, 0);
    }

    #[test]
    fn test_validate_candles_empty() {
        assert!(matches!(validate_candles(&[]), Err(DataError::EmptyData)));
    }

    #[test]
    fn test_validate_candles_non_monotonic() {
        let candles = vec![make_candle(1, 1.0), make_candle(3, 1.0), make_candle(3, 1.0)];
        let err = validate_candles(&candles).unwrap_err();
        assert!(matches!(
            err,
            DataError::NonMonotonicIndex {
                position: 2,
                previous: 3,
                current: 3
            }
        ));
    }

    #[test]
    fn test_validate_candles_counts_missing() {
        let mut candles: Vec<Candle> = (0..3).map(|i| make_candle(i, 5.0)).collect();
        candles[1].close = f64::NAN;
        let stats = validate_candles(&candles).unwrap();
        assert_eq!(stats.incomplete_bars, 1);
    }

    #[test]
    fn test_validate_candles_rejects_infinite_and_inverted() {
        let mut candles = vec![make_candle(0, 5.0)];
        candles[0].high = f64::INFINITY;
        assert!(matches!(
            validate_candles(&candles),
            Err(DataError::CorruptData(_))
        ));

        let inverted = vec![Candle::new(0, 5.0, 4.0, 6.0, 5.0, 0.0)];
        assert!(matches!(
            validate_candles(&inverted),
            Err(DataError::CorruptData(_))
        ));
    }

    #[test]
    fn test_validate_series_length_mismatch() {
        let mut series = BarSeries::from_candles(&[make_candle(0, 1.0), make_candle(1, 2.0)]);
        series.close.pop();
        assert!(matches!(
            validate_series(&series),
            Err(DataError::LengthMismatch {
                column: "close",
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_validate_index() {
        assert!(validate_index(&[]).is_ok());
        assert!(validate_index(&[1, 2, 10]).is_ok());
        assert!(validate_index(&[1, 0]).is_err());
    }
}
