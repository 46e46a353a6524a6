//! Quantitative Qualitative Estimation (QQE)

use serde::{Deserialize, Serialize};

use kairos_types::{Candle, Series};

use super::Trend;
use crate::engine::{self, Transition};
use crate::error::IndicatorError;
use crate::lines::{self, MaMode, ma::ema, rsi::rsi};
use crate::params::{NormalizeParams, Normalizer};
use crate::traits::{IntoMultiSeries, MultiOutputIndicator};

const DEFAULT_LENGTH: usize = 14;
const DEFAULT_SMOOTH: usize = 5;
const DEFAULT_FACTOR: f64 = 4.236;

/// QQE parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QqeParams {
    /// RSI length
    pub length: usize,
    /// Smoothing length applied to the RSI
    pub smooth: usize,
    /// Band width multiplier
    pub factor: f64,
    /// Moving average used to smooth the RSI
    pub mamode: MaMode,
}

impl Default for QqeParams {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            smooth: DEFAULT_SMOOTH,
            factor: DEFAULT_FACTOR,
            mamode: MaMode::Ema,
        }
    }
}

impl QqeParams {
    /// Wilder period of the band smoothing.
    #[must_use]
    pub fn wilders_length(&self) -> usize {
        self.length.saturating_mul(2).saturating_sub(1)
    }

    /// Sets the smoothing mode from its name.
    ///
    /// # Errors
    /// Returns [`IndicatorError::UnknownMaMode`] for an unrecognized name.
    pub fn with_mamode(mut self, mode: &str) -> Result<Self, IndicatorError> {
        self.mamode = mode.parse()?;
        Ok(self)
    }
}

impl NormalizeParams for QqeParams {
    const INDICATOR: &'static str = "QQE";

    fn normalize_with(&self, n: &mut Normalizer) -> Self {
        Self {
            length: n.length("length", self.length, DEFAULT_LENGTH),
            smooth: n.length("smooth", self.smooth, DEFAULT_SMOOTH),
            factor: n.positive("factor", self.factor, DEFAULT_FACTOR),
            mamode: self.mamode,
        }
    }
}

/// Smoothed momentum and band width for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QqeInput {
    /// Smoothed momentum (RSI MA)
    pub momentum: f64,
    /// Band half-width
    pub dar: f64,
}

/// Recurrence state. Crossing tests look two bars back on the lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QqeState {
    long: f64,
    short: f64,
    long_prev: Option<f64>,
    short_prev: Option<f64>,
    momentum: f64,
    trend: Trend,
}

/// Per-bar oscillator output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QqeBar {
    /// Active line
    pub value: f64,
    /// Trailing long line
    pub long: f64,
    /// Trailing short line
    pub short: f64,
    /// Active side
    pub trend: Trend,
}

/// QQE band-tracking transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct QqeTransition;

impl Transition for QqeTransition {
    type Input = QqeInput;
    type State = QqeState;
    type Output = QqeBar;

    fn min_len(&self) -> usize {
        1
    }

    fn init(&self, head: &[QqeInput]) -> (QqeState, QqeBar) {
        let QqeInput { momentum, dar } = head[0];
        let long = momentum - dar;
        let short = momentum + dar;
        let state = QqeState {
            long,
            short,
            long_prev: None,
            short_prev: None,
            momentum,
            trend: Trend::Rising,
        };
        let bar = QqeBar {
            value: long,
            long,
            short,
            trend: Trend::Rising,
        };
        (state, bar)
    }

    fn step(&self, s: QqeState, bar: &QqeInput) -> (QqeState, QqeBar) {
        let current = bar.momentum;
        let previous = s.momentum;
        let upper = current + bar.dar;
        let lower = current - bar.dar;

        let long = if previous > s.long && current > s.long {
            s.long.max(lower)
        } else {
            lower
        };
        let short = if previous < s.short && current < s.short {
            s.short.min(upper)
        } else {
            upper
        };

        let crossed_up = s
            .short_prev
            .is_some_and(|short_prev| current > s.short && previous < short_prev);
        let crossed_down = s
            .long_prev
            .is_some_and(|long_prev| current <= s.long && previous >= long_prev);

        let trend = if crossed_up {
            Trend::Rising
        } else if crossed_down {
            Trend::Falling
        } else {
            s.trend
        };
        let value = match trend {
            Trend::Rising => long,
            Trend::Falling => short,
        };

        let next = QqeState {
            long,
            short,
            long_prev: Some(s.long),
            short_prev: Some(s.short),
            momentum: current,
            trend,
        };
        (
            next,
            QqeBar {
                value,
                long,
                short,
                trend,
            },
        )
    }
}

/// QQE outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct QqeResult {
    /// Active line (long line in an up trend, short line in a down trend)
    pub qqe: Series,
    /// Smoothed momentum
    pub rsi_ma: Series,
    /// Oscillator value while the trend is up
    pub qqe_long: Series,
    /// Oscillator value while the trend is down
    pub qqe_short: Series,
    /// Trailing long line
    pub long_line: Series,
    /// Trailing short line
    pub short_line: Series,
    /// +1.0 up, -1.0 down
    pub trend: Series,
}

impl IntoMultiSeries for QqeResult {
    fn into_series(self) -> Vec<Series> {
        vec![
            self.qqe,
            self.rsi_ma,
            self.qqe_long,
            self.qqe_short,
            self.long_line,
            self.short_line,
            self.trend,
        ]
    }
}

/// Runs the band tracker over externally supplied momentum and band width.
///
/// The scan starts at the first bar where both lines are defined; later gaps
/// carry the last defined value of each line.
///
/// # Errors
/// Returns [`IndicatorError::LengthMismatch`] when `dar` is not aligned with `momentum`.
pub fn qqe_from_lines(
    momentum: &[Option<f64>],
    dar: &[Option<f64>],
) -> Result<QqeResult, IndicatorError> {
    IndicatorError::check_len("dar", momentum.len(), dar.len())?;
    Ok(track(momentum, dar))
}

fn track(momentum: &[Option<f64>], dar: &[Option<f64>]) -> QqeResult {
    let start = momentum
        .iter()
        .zip(dar)
        .position(|(m, d)| m.is_some() && d.is_some())
        .unwrap_or(momentum.len());

    let mut last = QqeInput {
        momentum: 0.0,
        dar: 0.0,
    };
    let inputs: Vec<QqeInput> = momentum[start..]
        .iter()
        .zip(&dar[start..])
        .map(|(m, d)| {
            last = QqeInput {
                momentum: m.unwrap_or(last.momentum),
                dar: d.unwrap_or(last.dar),
            };
            last
        })
        .collect();

    let rows = engine::evaluate_from(&QqeTransition, start, &inputs);
    QqeResult {
        qqe: engine::project(&rows, |r| Some(r.value)),
        rsi_ma: momentum.to_vec(),
        qqe_long: engine::project(&rows, |r| (r.trend == Trend::Rising).then_some(r.value)),
        qqe_short: engine::project(&rows, |r| (r.trend == Trend::Falling).then_some(r.value)),
        long_line: engine::project(&rows, |r| Some(r.long)),
        short_line: engine::project(&rows, |r| Some(r.short)),
        trend: engine::project(&rows, |r| Some(r.trend.sign())),
    }
}

/// QQE
///
/// RSI smoothed by `mamode`, with trailing long/short bands at
/// `factor * EMA(EMA(|Δ rsi_ma|))` around it. The active band flips when the
/// smoothed RSI crosses the opposite band.
#[derive(Debug, Clone)]
pub struct Qqe {
    /// Normalized parameters
    pub params: QqeParams,
}

impl Qqe {
    /// Creates a QQE oscillator, replacing invalid parameters by defaults.
    #[must_use]
    pub fn new(params: QqeParams) -> Self {
        Self {
            params: params.normalized(),
        }
    }

    /// Builds the momentum and band lines from closes and runs the tracker.
    #[must_use]
    pub fn compute_line(&self, close: &[f64]) -> QqeResult {
        let QqeParams {
            length,
            smooth,
            factor,
            mamode,
        } = self.params;
        let wilders = self.params.wilders_length();

        let rsi = rsi(&lines::from_column(close), length);
        let rsi_ma = mamode.apply(&rsi, smooth);
        let tr = lines::abs_change(&rsi_ma);
        let dar: Series = ema(&ema(&tr, wilders), wilders)
            .into_iter()
            .map(|v| v.map(|x| factor * x))
            .collect();

        track(&rsi_ma, &dar)
    }

    fn mode_tag(&self) -> &'static str {
        match self.params.mamode {
            MaMode::Ema => "",
            MaMode::Sma => "s",
            MaMode::Rma => "r",
            MaMode::Wma => "w",
        }
    }
}

impl Default for Qqe {
    fn default() -> Self {
        Self::new(QqeParams::default())
    }
}

impl MultiOutputIndicator for Qqe {
    type Output = QqeResult;

    fn compute_all(&self, candles: &[Candle]) -> Self::Output {
        let close: Vec<f64> = candles.iter().map(|c| c.close).collect();
        self.compute_line(&close)
    }

    fn name(&self) -> &str {
        "QQE"
    }

    fn label(&self) -> String {
        let p = &self.params;
        format!(
            "QQE{}_{}_{}_{}",
            self.mode_tag(),
            p.length,
            p.smooth,
            p.factor
        )
    }

    /// RSI (`length`) + smoothing (`smooth - 1`) + one change + two band EMAs.
    fn warmup_periods(&self) -> usize {
        let p = &self.params;
        p.length
            .saturating_add(p.smooth)
            .saturating_add(p.wilders_length().saturating_mul(2))
            .saturating_sub(2)
    }

    fn output_names(&self) -> &'static [&'static str] {
        &[
            "qqe",
            "rsi_ma",
            "qqe_long",
            "qqe_short",
            "long_line",
            "short_line",
            "trend",
        ]
    }
}
