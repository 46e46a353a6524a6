//! Schaff Trend Cycle (STC)

use serde::{Deserialize, Serialize};

use kairos_types::{Candle, Series};

use crate::engine::{self, Transition};
use crate::error::IndicatorError;
use crate::guards::{clamp, positive_range, round_to};
use crate::lines::{self, ma::ema, rolling};
use crate::params::{NormalizeParams, Normalizer};
use crate::traits::{IntoMultiSeries, MultiOutputIndicator};

const DEFAULT_TCLENGTH: usize = 10;
const DEFAULT_FAST: usize = 12;
const DEFAULT_SLOW: usize = 26;
const DEFAULT_FACTOR: f64 = 0.5;
/// Decimal places kept by each smoothing pass.
const PRECISION: i32 = 8;

/// STC parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StcParams {
    /// Stochastic window (cycle length)
    pub tclength: usize,
    /// Fast EMA length
    pub fast: usize,
    /// Slow EMA length
    pub slow: usize,
    /// Smoothing factor in `(0, 1]`
    pub factor: f64,
}

impl Default for StcParams {
    fn default() -> Self {
        Self {
            tclength: DEFAULT_TCLENGTH,
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            factor: DEFAULT_FACTOR,
        }
    }
}

impl NormalizeParams for StcParams {
    const INDICATOR: &'static str = "STC";

    fn normalize_with(&self, n: &mut Normalizer) -> Self {
        let fast = n.length("fast", self.fast, DEFAULT_FAST);
        let slow = n.length("slow", self.slow, DEFAULT_SLOW);
        let (fast, slow) = if slow < fast { (slow, fast) } else { (fast, slow) };
        Self {
            tclength: n.length("tclength", self.tclength, DEFAULT_TCLENGTH),
            fast,
            slow,
            factor: n.within("factor", self.factor, 0.0, 1.0, DEFAULT_FACTOR),
        }
    }
}

/// Where the momentum-difference line comes from. Every source feeds the
/// same double-stochastic normalizer.
#[derive(Debug, Clone, Copy)]
pub enum StcSource<'a> {
    /// `EMA(fast) - EMA(slow)` of a price column.
    Ema(&'a [f64]),
    /// Difference of two externally supplied averages, `ma1 - ma2`.
    MaPair {
        /// Faster average
        ma1: &'a [Option<f64>],
        /// Slower average
        ma2: &'a [Option<f64>],
    },
    /// Externally supplied oscillator used as is.
    Oscillator(&'a [Option<f64>]),
}

impl StcSource<'_> {
    /// Builds the momentum-difference line.
    ///
    /// # Errors
    /// Returns [`IndicatorError::LengthMismatch`] when a moving-average pair is not aligned.
    pub fn line(&self, params: &StcParams) -> Result<Series, IndicatorError> {
        match self {
            StcSource::Ema(prices) => Ok(ema_difference(prices, params)),
            StcSource::MaPair { ma1, ma2 } => {
                IndicatorError::check_len("ma2", ma1.len(), ma2.len())?;
                Ok(lines::difference(ma1, ma2))
            }
            StcSource::Oscillator(line) => Ok(line.to_vec()),
        }
    }
}

fn ema_difference(prices: &[f64], params: &StcParams) -> Series {
    let prices = lines::from_column(prices);
    lines::difference(&ema(&prices, params.fast), &ema(&prices, params.slow))
}

/// One bar of a stochastic pass: the value and its rolling range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochInput {
    /// Current value, if defined
    pub value: Option<f64>,
    /// Rolling lowest
    pub lowest: f64,
    /// Rolling highest
    pub highest: f64,
}

/// Raw stochastic and its smoothed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochBar {
    /// Position within the rolling range, `[0, 100]`
    pub stoch: f64,
    /// Smoothed stochastic, `[0, 100]`
    pub smoothed: f64,
}

/// One smoothed-stochastic pass. A zero range or a gap carries the previous
/// stochastic forward.
#[derive(Debug, Clone, Copy)]
pub struct StochTransition {
    factor: f64,
}

impl StochTransition {
    fn advance(&self, prev: StochBar, bar: &StochInput) -> StochBar {
        let stoch = match (bar.value, positive_range(bar.highest, bar.lowest)) {
            (Some(x), Some(range)) => clamp(100.0 * (x - bar.lowest) / range, 0.0, 100.0),
            _ => prev.stoch,
        };
        let smoothed = prev.smoothed + self.factor * (stoch - prev.smoothed);
        StochBar {
            stoch,
            smoothed: clamp(round_to(smoothed, PRECISION), 0.0, 100.0),
        }
    }
}

impl Transition for StochTransition {
    type Input = StochInput;
    type State = StochBar;
    type Output = StochBar;

    fn min_len(&self) -> usize {
        1
    }

    fn init(&self, head: &[StochInput]) -> (StochBar, StochBar) {
        let zero = StochBar {
            stoch: 0.0,
            smoothed: 0.0,
        };
        let bar = self.advance(zero, &head[0]);
        (bar, bar)
    }

    fn step(&self, state: StochBar, bar: &StochInput) -> (StochBar, StochBar) {
        let next = self.advance(state, bar);
        (next, next)
    }
}

/// Runs one stochastic pass over `line`, starting where its rolling range
/// first becomes available.
#[must_use]
pub fn stochastic_pass(line: &[Option<f64>], tclength: usize, factor: f64) -> Vec<Option<StochBar>> {
    let lowest = rolling::lowest(line, tclength);
    let highest = rolling::highest(line, tclength);
    let Some(start) = lines::first_defined(&lowest) else {
        return vec![None; line.len()];
    };

    let inputs: Vec<StochInput> = (start..line.len())
        .map(|i| StochInput {
            value: line[i],
            lowest: lowest[i].unwrap_or_default(),
            highest: highest[i].unwrap_or_default(),
        })
        .collect();
    engine::evaluate_from(&StochTransition { factor }, start, &inputs)
}

/// STC outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct StcResult {
    /// Second smoothed stochastic (the cycle)
    pub stc: Series,
    /// Momentum-difference line
    pub macd: Series,
    /// First smoothed stochastic
    pub stoch: Series,
}

impl IntoMultiSeries for StcResult {
    fn into_series(self) -> Vec<Series> {
        vec![self.stc, self.macd, self.stoch]
    }
}

/// Schaff Trend Cycle
///
/// A momentum-difference line normalized twice by a smoothed stochastic over
/// `tclength` bars; the result cycles between 0 and 100.
#[derive(Debug, Clone)]
pub struct Stc {
    /// Normalized parameters
    pub params: StcParams,
}

impl Stc {
    /// Creates an STC, replacing invalid parameters by defaults.
    #[must_use]
    pub fn new(params: StcParams) -> Self {
        Self {
            params: params.normalized(),
        }
    }

    /// Computes from any [`StcSource`].
    ///
    /// # Errors
    /// Returns [`IndicatorError::LengthMismatch`] when the source lines are not aligned.
    pub fn compute_source(&self, source: StcSource<'_>) -> Result<StcResult, IndicatorError> {
        let macd = source.line(&self.params)?;
        Ok(self.normalize(macd))
    }

    /// Double normalization of a momentum-difference line.
    #[must_use]
    pub fn normalize(&self, macd: Series) -> StcResult {
        let StcParams {
            tclength, factor, ..
        } = self.params;

        let first = stochastic_pass(&macd, tclength, factor);
        let stoch = engine::project(&first, |b| Some(b.smoothed));
        let second = stochastic_pass(&stoch, tclength, factor);

        StcResult {
            stc: engine::project(&second, |b| Some(b.smoothed)),
            macd,
            stoch,
        }
    }
}

impl Default for Stc {
    fn default() -> Self {
        Self::new(StcParams::default())
    }
}

impl MultiOutputIndicator for Stc {
    type Output = StcResult;

    fn compute_all(&self, candles: &[Candle]) -> Self::Output {
        let close: Vec<f64> = candles.iter().map(|c| c.close).collect();
        self.normalize(ema_difference(&close, &self.params))
    }

    fn name(&self) -> &str {
        "STC"
    }

    fn label(&self) -> String {
        let p = &self.params;
        format!("STC_{}_{}_{}_{}", p.tclength, p.fast, p.slow, p.factor)
    }

    /// Slow EMA seed plus two full stochastic windows.
    fn warmup_periods(&self) -> usize {
        let p = &self.params;
        (p.slow - 1).saturating_add((p.tclength - 1).saturating_mul(2))
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["stc", "macd", "stoch"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: &[f64]) -> Series {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_stochastic_pass_values() {
        let bars = stochastic_pass(&line(&[1.0, 3.0, 2.0, 2.0]), 2, 0.5);

        assert!(bars[0].is_none());
        // window [1, 3]: stoch 100, smoothed 0 + 0.5 * 100
        let b1 = bars[1].unwrap();
        assert!((b1.stoch - 100.0).abs() < 1e-10);
        assert!((b1.smoothed - 50.0).abs() < 1e-10);
        // window [3, 2]: stoch 0, smoothed 25
        let b2 = bars[2].unwrap();
        assert!(b2.stoch.abs() < 1e-10);
        assert!((b2.smoothed - 25.0).abs() < 1e-10);
        // window [2, 2]: zero range carries stoch 0, smoothed 12.5
        let b3 = bars[3].unwrap();
        assert!(b3.stoch.abs() < 1e-10);
        assert!((b3.smoothed - 12.5).abs() < 1e-10);
    }

    #[test]
    fn test_small_magnitude_range_is_not_flat() {
        let bars = stochastic_pass(&line(&[1e-13, 3e-13, 2e-13]), 2, 1.0);
        assert!((bars[1].unwrap().stoch - 100.0).abs() < 1e-10);
        assert!(bars[2].unwrap().stoch.abs() < 1e-10);
    }

    #[test]
    fn test_flat_line_stays_zero() {
        let bars = stochastic_pass(&line(&[7.0; 12]), 3, 0.5);
        assert!(bars[2..].iter().all(|b| b.unwrap() == StochBar {
            stoch: 0.0,
            smoothed: 0.0
        }));
    }

    #[test]
    fn test_sources_share_normalizer() {
        let close: Vec<f64> = (0..80)
            .map(|i| 50.0 + (f64::from(i) * 0.2).sin() * 4.0)
            .collect();
        let stc = Stc::default();

        let from_close = stc.compute_source(StcSource::Ema(&close)).unwrap();

        let prices = lines::from_column(&close);
        let fast = ema(&prices, 12);
        let slow = ema(&prices, 26);
        let from_pair = stc
            .compute_source(StcSource::MaPair {
                ma1: &fast,
                ma2: &slow,
            })
            .unwrap();
        let from_osc = stc
            .compute_source(StcSource::Oscillator(&from_close.macd))
            .unwrap();

        assert_eq!(from_close, from_pair);
        assert_eq!(from_close, from_osc);
    }

    #[test]
    fn test_lookback_and_bounds() {
        let close: Vec<f64> = (0..120)
            .map(|i| 20.0 + (f64::from(i) * 0.15).cos() * 2.0 + f64::from(i) * 0.01)
            .collect();
        let stc = Stc::default();
        let result = stc.compute_source(StcSource::Ema(&close)).unwrap();

        assert_eq!(stc.warmup_periods(), 43);
        assert_eq!(result.stc.iter().take_while(|v| v.is_none()).count(), 43);
        assert_eq!(result.stoch.iter().take_while(|v| v.is_none()).count(), 34);
        for v in result.stc.iter().chain(&result.stoch).flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_slow_fast_swap_and_factor_default() {
        let stc = Stc::new(StcParams {
            tclength: 10,
            fast: 26,
            slow: 12,
            factor: 1.5,
        });
        assert_eq!(stc.params.fast, 12);
        assert_eq!(stc.params.slow, 26);
        assert!((stc.params.factor - 0.5).abs() < 1e-12);
        assert_eq!(stc.label(), "STC_10_12_26_0.5");
    }

    #[test]
    fn test_ma_pair_mismatch() {
        let err = Stc::default()
            .compute_source(StcSource::MaPair {
                ma1: &line(&[1.0, 2.0]),
                ma2: &line(&[1.0]),
            })
            .unwrap_err();
        assert!(matches!(err, IndicatorError::LengthMismatch { name: "ma2", .. }));
    }

    #[test]
    fn test_short_input_undefined() {
        let result = Stc::default()
            .compute_source(StcSource::Oscillator(&line(&[1.0, 2.0, 3.0])))
            .unwrap();
        assert!(result.stc.iter().all(Option::is_none));
        assert_eq!(result.stc.len(), 3);
    }

    #[test]
    fn test_window_longer_than_input() {
        let stc = Stc::new(StcParams {
            tclength: 1 << 40,
            ..StcParams::default()
        });
        let osc: Series = (0..50).map(|i| Some(f64::from(i).sin())).collect();
        let result = stc.compute_source(StcSource::Oscillator(&osc)).unwrap();

        assert!(result.stc.iter().chain(&result.stoch).all(Option::is_none));
        assert!(stc.warmup_periods() > 1 << 40);
    }
}
