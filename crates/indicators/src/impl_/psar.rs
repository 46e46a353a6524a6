//! Parabolic Stop-and-Reverse (PSAR) trend tracker

use serde::{Deserialize, Serialize};

use kairos_types::{Candle, Series};

use super::Trend;
use crate::engine::{self, Transition};
use crate::error::IndicatorError;
use crate::params::{NormalizeParams, Normalizer};
use crate::traits::{IntoMultiSeries, MultiOutputIndicator};

const DEFAULT_AF: f64 = 0.02;
const DEFAULT_MAX_AF: f64 = 0.2;

/// PSAR parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsarParams {
    /// Initial acceleration factor, restored on every reversal
    pub af0: f64,
    /// Increment applied each time the extreme point extends
    pub af: f64,
    /// Acceleration cap
    pub max_af: f64,
}

impl Default for PsarParams {
    fn default() -> Self {
        Self {
            af0: DEFAULT_AF,
            af: DEFAULT_AF,
            max_af: DEFAULT_MAX_AF,
        }
    }
}

impl NormalizeParams for PsarParams {
    const INDICATOR: &'static str = "PSAR";

    fn normalize_with(&self, n: &mut Normalizer) -> Self {
        let af = n.positive("af", self.af, DEFAULT_AF);
        let max_af = n.positive("max_af", self.max_af, DEFAULT_MAX_AF);
        // af0 defaults to af; a start above the cap is pulled down to it.
        let fallback = if self.af0 > max_af { max_af } else { af.min(max_af) };
        let af0 = n.within("af0", self.af0, 0.0, max_af, fallback);
        Self { af0, af, max_af }
    }
}

/// High/low pair consumed per bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighLow {
    /// Bar high
    pub high: f64,
    /// Bar low
    pub low: f64,
}

/// Recurrence state carried between bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsarState {
    /// Current trend
    pub trend: Trend,
    /// Stop value of the previous bar
    pub stop: f64,
    /// Extreme point since the last reversal
    pub extreme: f64,
    /// Current acceleration factor
    pub af: f64,
    prev: HighLow,
    prev2: HighLow,
}

/// Per-bar tracker output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsarBar {
    /// Stop value
    pub sar: f64,
    /// Trend after this bar
    pub trend: Trend,
    /// Acceleration factor after this bar
    pub af: f64,
    /// True when the trend flipped on this bar
    pub reversal: bool,
}

/// PSAR transition. `seed_stop` overrides the initial stop (the first close).
#[derive(Debug, Clone, Copy)]
pub struct PsarTransition {
    params: PsarParams,
    seed_stop: Option<f64>,
}

impl PsarTransition {
    /// Falling when the first bar pair shows a positive, dominant minus-DM.
    fn seeds_falling(first: HighLow, second: HighLow) -> bool {
        let up = second.high - first.high;
        let dn = first.low - second.low;
        dn > up && dn > 0.0
    }

    fn start_af(&self) -> f64 {
        self.params.af0.min(self.params.max_af)
    }
}

impl Transition for PsarTransition {
    type Input = HighLow;
    type State = PsarState;
    type Output = PsarBar;

    fn min_len(&self) -> usize {
        2
    }

    fn seed_len(&self) -> usize {
        2
    }

    fn warmup(&self) -> usize {
        1
    }

    fn init(&self, head: &[HighLow]) -> (PsarState, PsarBar) {
        let first = head[0];
        let (trend, stop, extreme) = if Self::seeds_falling(first, head[1]) {
            (Trend::Falling, first.high, first.low)
        } else {
            (Trend::Rising, first.low, first.high)
        };
        let stop = self.seed_stop.filter(|c| c.is_finite()).unwrap_or(stop);

        let state = PsarState {
            trend,
            stop,
            extreme,
            af: self.start_af(),
            prev: first,
            prev2: first,
        };
        let bar = PsarBar {
            sar: stop,
            trend,
            af: self.start_af(),
            reversal: false,
        };
        (state, bar)
    }

    fn step(&self, state: PsarState, bar: &HighLow) -> (PsarState, PsarBar) {
        let PsarParams { af0, af: step, max_af } = self.params;
        let PsarState {
            trend,
            stop,
            mut extreme,
            mut af,
            prev,
            prev2,
        } = state;

        let projected = stop + af * (extreme - stop);
        let reversal = match trend {
            Trend::Rising => bar.low < projected,
            Trend::Falling => bar.high > projected,
        };

        let (trend, sar) = if reversal {
            let sar = extreme;
            let trend = trend.flipped();
            af = af0.min(max_af);
            extreme = match trend {
                Trend::Rising => bar.high,
                Trend::Falling => bar.low,
            };
            (trend, sar)
        } else {
            let sar = match trend {
                Trend::Rising => {
                    if bar.high > extreme {
                        extreme = bar.high;
                        af = (af + step).min(max_af);
                    }
                    projected.min(prev.low).min(prev2.low)
                }
                Trend::Falling => {
                    if bar.low < extreme {
                        extreme = bar.low;
                        af = (af + step).min(max_af);
                    }
                    projected.max(prev.high).max(prev2.high)
                }
            };
            (trend, sar)
        };

        let next = PsarState {
            trend,
            stop: sar,
            extreme,
            af,
            prev: *bar,
            prev2: prev,
        };
        let out = PsarBar {
            sar,
            trend,
            af,
            reversal,
        };
        (next, out)
    }
}

/// PSAR outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PsarResult {
    /// Stop while rising, undefined while falling
    pub long: Series,
    /// Stop while falling, undefined while rising
    pub short: Series,
    /// Acceleration factor
    pub af: Series,
    /// 1.0 on reversal bars, 0.0 otherwise
    pub reversal: Series,
    /// Stop regardless of direction
    pub sar: Series,
    /// +1.0 rising, -1.0 falling
    pub trend: Series,
}

impl IntoMultiSeries for PsarResult {
    fn into_series(self) -> Vec<Series> {
        vec![
            self.long,
            self.short,
            self.af,
            self.reversal,
            self.sar,
            self.trend,
        ]
    }
}

/// Parabolic SAR
///
/// The stop trails price by `af * (EP - stop)` each bar, never crossing the
/// two preceding bars' range, and flips sides when price penetrates it.
#[derive(Debug, Clone)]
pub struct Psar {
    /// Normalized parameters
    pub params: PsarParams,
}

impl Psar {
    /// Creates a PSAR tracker, replacing invalid parameters by defaults.
    #[must_use]
    pub fn new(params: PsarParams) -> Self {
        Self {
            params: params.normalized(),
        }
    }

    /// Computes over aligned high/low columns. When `close` is supplied, the
    /// initial stop is the first defined bar's close.
    ///
    /// # Errors
    /// Returns [`IndicatorError::LengthMismatch`] when the columns are not aligned.
    pub fn compute_hl(
        &self,
        high: &[f64],
        low: &[f64],
        close: Option<&[f64]>,
    ) -> Result<PsarResult, IndicatorError> {
        IndicatorError::check_len("low", high.len(), low.len())?;
        if let Some(close) = close {
            IndicatorError::check_len("close", high.len(), close.len())?;
        }

        let bars: Vec<HighLow> = high
            .iter()
            .zip(low)
            .map(|(&high, &low)| HighLow { high, low })
            .collect();
        Ok(self.run(&bars, close))
    }

    fn run(&self, bars: &[HighLow], close: Option<&[f64]>) -> PsarResult {
        let start = bars
            .iter()
            .position(|b| b.high.is_finite() && b.low.is_finite())
            .unwrap_or(bars.len());
        let transition = PsarTransition {
            params: self.params,
            seed_stop: close.and_then(|c| c.get(start).copied()),
        };
        let rows = engine::evaluate_from(&transition, start, &bars[start..]);

        PsarResult {
            long: engine::project(&rows, |r| (r.trend == Trend::Rising).then_some(r.sar)),
            short: engine::project(&rows, |r| (r.trend == Trend::Falling).then_some(r.sar)),
            af: engine::project(&rows, |r| Some(r.af)),
            reversal: engine::project(&rows, |r| Some(if r.reversal { 1.0 } else { 0.0 })),
            sar: engine::project(&rows, |r| Some(r.sar)),
            trend: engine::project(&rows, |r| Some(r.trend.sign())),
        }
    }
}

impl Default for Psar {
    fn default() -> Self {
        Self::new(PsarParams::default())
    }
}

impl MultiOutputIndicator for Psar {
    type Output = PsarResult;

    fn compute_all(&self, candles: &[Candle]) -> Self::Output {
        let bars: Vec<HighLow> = candles
            .iter()
            .map(|c| HighLow {
                high: c.high,
                low: c.low,
            })
            .collect();
        let close: Vec<f64> = candles.iter().map(|c| c.close).collect();
        self.run(&bars, Some(&close))
    }

    fn name(&self) -> &str {
        "PSAR"
    }

    fn label(&self) -> String {
        format!("PSAR_{}_{}", self.params.af0, self.params.max_af)
    }

    fn warmup_periods(&self) -> usize {
        1
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["long", "short", "af", "reversal", "sar", "trend"]
    }
}
