//! Moving averages over aligned lines.

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use kairos_types::Series;

use crate::error::IndicatorError;

/// Moving-average kind, resolved from its name once before any scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaMode {
    /// Simple moving average.
    Sma,
    /// Exponential moving average, multiplier `2 / (length + 1)`, SMA seed.
    #[default]
    Ema,
    /// Wilder's smoothing, multiplier `1 / length`, SMA seed.
    Rma,
    /// Linearly weighted moving average.
    Wma,
}

impl MaMode {
    /// Returns lowercase string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MaMode::Sma => "sma",
            MaMode::Ema => "ema",
            MaMode::Rma => "rma",
            MaMode::Wma => "wma",
        }
    }

    /// Applies the average to `line`.
    ///
    /// Every mode produces its first value once `length` values have been
    /// seen, so the undefined prefix does not depend on the mode.
    #[must_use]
    pub fn apply(&self, line: &[Option<f64>], length: usize) -> Series {
        match self {
            MaMode::Sma => sma(line, length),
            MaMode::Ema => ema(line, length),
            MaMode::Rma => rma(line, length),
            MaMode::Wma => wma(line, length),
        }
    }
}

impl std::fmt::Display for MaMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MaMode {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sma" => Ok(MaMode::Sma),
            "ema" => Ok(MaMode::Ema),
            "rma" => Ok(MaMode::Rma),
            "wma" => Ok(MaMode::Wma),
            other => Err(IndicatorError::UnknownMaMode(other.to_string())),
        }
    }
}

/// Simple moving average over the last `length` defined values.
#[must_use]
pub fn sma(line: &[Option<f64>], length: usize) -> Series {
    let mut out = vec![None; line.len()];
    if length == 0 {
        return out;
    }

    let mut window: VecDeque<f64> = VecDeque::with_capacity(length.min(line.len()) + 1);
    let mut sum = 0.0;
    let mut last = None;
    for (i, value) in line.iter().enumerate() {
        if let Some(v) = value {
            window.push_back(*v);
            sum += v;
            if window.len() > length
                && let Some(old) = window.pop_front()
            {
                sum -= old;
            }
            if window.len() == length {
                last = Some(sum / length as f64);
            }
        }
        out[i] = last;
    }
    out
}

/// Exponential moving average, seeded with the SMA of the first `length` values.
#[must_use]
pub fn ema(line: &[Option<f64>], length: usize) -> Series {
    exponential(line, length, 2.0 / (length as f64 + 1.0))
}

/// Wilder's moving average, seeded with the SMA of the first `length` values.
#[must_use]
pub fn rma(line: &[Option<f64>], length: usize) -> Series {
    exponential(line, length, 1.0 / length as f64)
}

/// Linearly weighted moving average (weights `1..=length`, newest heaviest).
#[must_use]
pub fn wma(line: &[Option<f64>], length: usize) -> Series {
    let mut out = vec![None; line.len()];
    if length == 0 {
        return out;
    }

    let n = length as f64;
    let norm = n * (n + 1.0) / 2.0;
    let mut window: VecDeque<f64> = VecDeque::with_capacity(length.min(line.len()) + 1);
    let mut last = None;
    for (i, value) in line.iter().enumerate() {
        if let Some(v) = value {
            window.push_back(*v);
            if window.len() > length {
                window.pop_front();
            }
            if window.len() == length {
                let weighted: f64 = window
                    .iter()
                    .enumerate()
                    .map(|(k, x)| (k + 1) as f64 * x)
                    .sum();
                last = Some(weighted / norm);
            }
        }
        out[i] = last;
    }
    out
}

fn exponential(line: &[Option<f64>], length: usize, alpha: f64) -> Series {
    let mut out = vec![None; line.len()];
    if length == 0 {
        return out;
    }

    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;
    let mut prev: Option<f64> = None;
    for (i, value) in line.iter().enumerate() {
        match (value, prev) {
            (Some(v), Some(p)) => prev = Some(p + alpha * (v - p)),
            (Some(v), None) => {
                seed_sum += v;
                seed_count += 1;
                if seed_count == length {
                    prev = Some(seed_sum / length as f64);
                }
            }
            (None, _) => {}
        }
        out[i] = prev;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: &[f64]) -> Series {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_sma_basic() {
        let result = sma(&line(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert!((result[2].unwrap() - 2.0).abs() < 1e-10);
        assert!((result[3].unwrap() - 3.0).abs() < 1e-10);
        assert!((result[4].unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_sma_seed() {
        let result = ema(&line(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        // seed = mean(1, 2, 3) = 2, alpha = 0.5
        assert!(result[1].is_none());
        assert!((result[2].unwrap() - 2.0).abs() < 1e-10);
        assert!((result[3].unwrap() - 3.0).abs() < 1e-10);
        assert!((result[4].unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_converges_to_constant() {
        let result = ema(&line(&[5.0; 20]), 5);
        for (i, value) in result.iter().enumerate().skip(4) {
            assert!(
                (value.unwrap() - 5.0).abs() < 1e-10,
                "EMA[{i}] = {value:?} != 5.0"
            );
        }
    }

    #[test]
    fn test_rma_multiplier() {
        let result = rma(&line(&[2.0, 2.0, 8.0]), 2);
        // seed 2.0, then 2 + 0.5 * (8 - 2)
        assert!((result[2].unwrap() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_wma_weights() {
        let result = wma(&line(&[1.0, 2.0, 3.0]), 3);
        // (1*1 + 2*2 + 3*3) / 6
        assert!((result[2].unwrap() - 14.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_undefined_prefix_is_skipped() {
        let input = vec![None, None, Some(1.0), Some(3.0)];
        for mode in [MaMode::Sma, MaMode::Ema, MaMode::Rma, MaMode::Wma] {
            let result = mode.apply(&input, 2);
            assert_eq!(result[..3], [None, None, None], "{mode}");
            assert!(result[3].is_some(), "{mode}");
        }
    }

    #[test]
    fn test_gap_carries_previous() {
        let result = sma(&[Some(1.0), Some(3.0), None, Some(5.0)], 2);
        assert_eq!(result, vec![None, Some(2.0), Some(2.0), Some(4.0)]);
    }

    #[test]
    fn test_ma_mode_from_str() {
        assert_eq!("EMA".parse::<MaMode>().unwrap(), MaMode::Ema);
        assert_eq!(" rma ".parse::<MaMode>().unwrap(), MaMode::Rma);
        let err = "hull".parse::<MaMode>().unwrap_err();
        assert!(matches!(err, IndicatorError::UnknownMaMode(name) if name == "hull"));
    }

    #[test]
    fn test_period_zero_is_undefined() {
        let input = line(&[1.0, 2.0]);
        for mode in [MaMode::Sma, MaMode::Ema, MaMode::Rma, MaMode::Wma] {
            assert!(mode.apply(&input, 0).iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_window_longer_than_input() {
        let values = line(&[1.0, 2.0, 3.0]);
        for out in [sma(&values, 1 << 40), wma(&values, 1 << 40), ema(&values, 1 << 40)] {
            assert_eq!(out, vec![None, None, None]);
        }
    }
}
