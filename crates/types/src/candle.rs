//! Single OHLCV bar.

/// One OHLCV bar.
///
/// `timestamp_ns` is the ordering key (bar open time). It is only used to
/// validate monotonicity and never enters indicator arithmetic. A missing
/// value is carried as `f64::NAN`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    /// Unix epoch nanoseconds UTC (open time)
    pub timestamp_ns: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    /// Creates a bar from its OHLCV fields.
    #[must_use]
    pub fn new(timestamp_ns: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp_ns,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Midpoint of the bar's range, `(high + low) / 2`.
    #[must_use]
    pub fn hl2(&self) -> f64 {
        0.5 * (self.high + self.low)
    }

    /// Returns true when all price fields are finite.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
    }
}
