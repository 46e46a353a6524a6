//! Price selection from a bar (close, midpoints, averages).

use serde::{Deserialize, Serialize};

use crate::Candle;

/// Price extracted from each bar before an indicator runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// Close price.
    #[default]
    Close,
    /// `(high + low) / 2`
    Hl2,
    /// `(high + low + close) / 3`
    Hlc3,
    /// `(open + high + low + close) / 4`
    Ohlc4,
}

impl PriceSource {
    /// Returns lowercase string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Close => "close",
            PriceSource::Hl2 => "hl2",
            PriceSource::Hlc3 => "hlc3",
            PriceSource::Ohlc4 => "ohlc4",
        }
    }

    /// Extracts the selected price from a bar.
    #[must_use]
    pub fn extract(&self, candle: &Candle) -> f64 {
        match self {
            PriceSource::Close => candle.close,
            PriceSource::Hl2 => candle.hl2(),
            PriceSource::Hlc3 => (candle.high + candle.low + candle.close) / 3.0,
            PriceSource::Ohlc4 => (candle.open + candle.high + candle.low + candle.close) / 4.0,
        }
    }

    /// Extracts the selected price from every bar.
    #[must_use]
    pub fn column(&self, candles: &[Candle]) -> Vec<f64> {
        candles.iter().map(|c| self.extract(c)).collect()
    }
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePriceSourceError;

impl std::fmt::Display for ParsePriceSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid price source")
    }
}

impl std::error::Error for ParsePriceSourceError {}

impl std::str::FromStr for PriceSource {
    type Err = ParsePriceSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "close" => Ok(PriceSource::Close),
            "hl2" => Ok(PriceSource::Hl2),
            "hlc3" => Ok(PriceSource::Hlc3),
            "ohlc4" => Ok(PriceSource::Ohlc4),
            _ => Err(ParsePriceSourceError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_source_from_str() {
        assert_eq!("close".parse::<PriceSource>(), Ok(PriceSource::Close));
        assert_eq!(" HL2 ".parse::<PriceSource>(), Ok(PriceSource::Hl2));
        assert!("typical".parse::<PriceSource>().is_err());
    }

    #[test]
    fn test_price_source_extract() {
        let candle = Candle::new(0, 1.0, 4.0, 2.0, 3.0, 0.0);
        assert!((PriceSource::Close.extract(&candle) - 3.0).abs() < 1e-12);
        assert!((PriceSource::Hl2.extract(&candle) - 3.0).abs() < 1e-12);
        assert!((PriceSource::Hlc3.extract(&candle) - 3.0).abs() < 1e-12);
        assert!((PriceSource::Ohlc4.extract(&candle) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_price_source_serde_lowercase() {
        let json = serde_json::to_string(&PriceSource::Ohlc4).unwrap();
        assert_eq!(json, "\"ohlc4\"");
    }
}
