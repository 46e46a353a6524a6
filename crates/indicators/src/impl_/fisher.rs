//! Fisher Transform

use serde::{Deserialize, Serialize};

use kairos_types::{Candle, Series};

use crate::engine::{self, Transition};
use crate::error::IndicatorError;
use crate::guards::{clamp, floor_at};
use crate::lines::{self, rolling};
use crate::params::{NormalizeParams, Normalizer};
use crate::postprocess::shift;
use crate::traits::{IntoMultiSeries, MultiOutputIndicator};

const DEFAULT_LENGTH: usize = 9;
const DEFAULT_SIGNAL: usize = 1;
/// Smallest range used to normalize the mid price.
const MIN_RANGE: f64 = 0.001;
/// Bound on the smoothed position fed to the log transform.
const V_LIMIT: f64 = 0.999;

/// Fisher Transform parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FisherParams {
    /// Rolling window of the mid-price range
    pub length: usize,
    /// Lag of the signal line
    pub signal: usize,
}

impl Default for FisherParams {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            signal: DEFAULT_SIGNAL,
        }
    }
}

impl NormalizeParams for FisherParams {
    const INDICATOR: &'static str = "FISHERT";

    fn normalize_with(&self, n: &mut Normalizer) -> Self {
        Self {
            length: n.length("length", self.length, DEFAULT_LENGTH),
            signal: n.length("signal", self.signal, DEFAULT_SIGNAL),
        }
    }
}

/// Smoothed position and transform output for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FisherBar {
    /// Smoothed position, within `[-0.999, 0.999]`
    pub v: f64,
    /// Transform output
    pub fisher: f64,
}

/// Transition over the mid-price position `(hl2 - lowest) / range - 0.5`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FisherTransition;

impl Transition for FisherTransition {
    type Input = Option<f64>;
    type State = FisherBar;
    type Output = FisherBar;

    fn min_len(&self) -> usize {
        1
    }

    fn init(&self, _head: &[Option<f64>]) -> (FisherBar, FisherBar) {
        let zero = FisherBar { v: 0.0, fisher: 0.0 };
        (zero, zero)
    }

    fn step(&self, prev: FisherBar, position: &Option<f64>) -> (FisherBar, FisherBar) {
        let Some(position) = *position else {
            return (prev, prev);
        };
        let v = clamp(0.66 * position + 0.67 * prev.v, -V_LIMIT, V_LIMIT);
        let fisher = 0.5 * (((1.0 + v) / (1.0 - v)).ln() + prev.fisher);
        let bar = FisherBar { v, fisher };
        (bar, bar)
    }
}

/// Fisher Transform outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FisherResult {
    /// Transform line
    pub fisher: Series,
    /// Transform lagged by `signal` bars
    pub signal: Series,
}

impl IntoMultiSeries for FisherResult {
    fn into_series(self) -> Vec<Series> {
        vec![self.fisher, self.signal]
    }
}

/// Fisher Transform
///
/// Maps the mid price's position within its rolling range onto a near-Gaussian
/// scale. The smoothed position is clamped short of ±1 so the log never
/// diverges.
#[derive(Debug, Clone)]
pub struct Fisher {
    /// Normalized parameters
    pub params: FisherParams,
}

impl Fisher {
    /// Creates a Fisher Transform, replacing invalid parameters by defaults.
    #[must_use]
    pub fn new(params: FisherParams) -> Self {
        Self {
            params: params.normalized(),
        }
    }

    /// Per-bar transform state over aligned high/low columns.
    ///
    /// # Errors
    /// Returns [`IndicatorError::LengthMismatch`] when the columns are not aligned.
    pub fn rows(&self, high: &[f64], low: &[f64]) -> Result<Vec<Option<FisherBar>>, IndicatorError> {
        IndicatorError::check_len("low", high.len(), low.len())?;
        Ok(self.scan(high, low))
    }

    /// Computes both lines over aligned high/low columns.
    ///
    /// # Errors
    /// Returns [`IndicatorError::LengthMismatch`] when the columns are not aligned.
    pub fn compute_hl(&self, high: &[f64], low: &[f64]) -> Result<FisherResult, IndicatorError> {
        let rows = self.rows(high, low)?;
        Ok(self.outputs(&rows))
    }

    fn scan(&self, high: &[f64], low: &[f64]) -> Vec<Option<FisherBar>> {
        let FisherParams { length, signal } = self.params;
        if high.len() < length.max(signal) {
            tracing::debug!(len = high.len(), length, signal, "insufficient data, output undefined");
            return vec![None; high.len()];
        }

        let hl2: Vec<f64> = high.iter().zip(low).map(|(h, l)| 0.5 * (h + l)).collect();
        let hl2 = lines::from_column(&hl2);
        let highest = rolling::highest(&hl2, length);
        let lowest = rolling::lowest(&hl2, length);

        let position: Vec<Option<f64>> = (0..hl2.len())
            .map(|i| match (hl2[i], lowest[i], highest[i]) {
                (Some(mid), Some(lo), Some(hi)) => {
                    Some((mid - lo) / floor_at(hi - lo, MIN_RANGE) - 0.5)
                }
                _ => None,
            })
            .collect();

        let start = lines::first_defined(&position).unwrap_or(position.len());
        engine::evaluate_from(&FisherTransition, start, &position[start..])
    }

    fn outputs(&self, rows: &[Option<FisherBar>]) -> FisherResult {
        let fisher = engine::project(rows, |b| Some(b.fisher));
        let lag = isize::try_from(self.params.signal).unwrap_or(isize::MAX);
        FisherResult {
            signal: shift(&fisher, lag),
            fisher,
        }
    }
}

impl Default for Fisher {
    fn default() -> Self {
        Self::new(FisherParams::default())
    }
}

impl MultiOutputIndicator for Fisher {
    type Output = FisherResult;

    fn compute_all(&self, candles: &[Candle]) -> Self::Output {
        let high: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let low: Vec<f64> = candles.iter().map(|c| c.low).collect();
        self.outputs(&self.scan(&high, &low))
    }

    fn name(&self) -> &str {
        "FISHERT"
    }

    fn label(&self) -> String {
        format!("FISHERT_{}_{}", self.params.length, self.params.signal)
    }

    fn warmup_periods(&self) -> usize {
        self.params.length - 1
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["fisher", "signal"]
    }
}
