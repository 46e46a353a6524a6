//! Jurik Moving Average (JMA)

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use kairos_types::{Candle, PriceSource, Series};

use crate::engine::{self, Transition};
use crate::guards::safe_div;
use crate::params::{NormalizeParams, Normalizer};
use crate::traits::{IntoMultiSeries, MultiOutputIndicator};

const DEFAULT_LENGTH: usize = 7;
/// Bars in the short volatility sum.
const SUM_LENGTH: usize = 10;
/// Bars averaged by the long volatility mean.
const AVG_LENGTH: usize = 66;

/// JMA parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JmaParams {
    /// Smoothing length
    pub length: usize,
    /// Phase in `[-100, 100]`; values outside saturate
    pub phase: f64,
    /// Price fed to the filter
    pub source: PriceSource,
}

impl Default for JmaParams {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            phase: 0.0,
            source: PriceSource::Close,
        }
    }
}

impl NormalizeParams for JmaParams {
    const INDICATOR: &'static str = "JMA";

    fn normalize_with(&self, n: &mut Normalizer) -> Self {
        Self {
            length: n.length("length", self.length, DEFAULT_LENGTH),
            phase: n.finite("phase", self.phase, 0.0),
            source: self.source,
        }
    }
}

/// Constants derived once from the parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    pow1: f64,
    bet: f64,
    beta: f64,
    phase_ratio: f64,
    /// Upper bound of the relative volatility ratio.
    volty_cap: f64,
}

impl Coefficients {
    fn new(length: usize, phase: f64) -> Self {
        let span = (length - 1) as f64;
        let half = 0.5 * span;

        let length1 = (half.sqrt().log2() + 2.0).max(0.0);
        let pow1 = (length1 - 2.0).max(0.5);
        let length2 = length1 * half.sqrt();
        let bet = length2 / (length2 + 1.0);
        let beta = 0.45 * span / (0.45 * span + 2.0);

        let phase_ratio = if phase < -100.0 {
            0.5
        } else if phase > 100.0 {
            2.5
        } else {
            1.5 + phase * 0.01
        };

        Self {
            pow1,
            bet,
            beta,
            phase_ratio,
            volty_cap: length1.powf(1.0 / pow1),
        }
    }
}

/// Recurrence state: three smoothing stages, the volatility bands and the
/// volatility history windows.
#[derive(Debug, Clone, PartialEq)]
pub struct JmaState {
    ma1: f64,
    det0: f64,
    det1: f64,
    jma: f64,
    upper: f64,
    lower: f64,
    /// Last `SUM_LENGTH + 1` volatility values.
    volty: VecDeque<f64>,
    /// Last `AVG_LENGTH` values of the volatility sum.
    v_sum: VecDeque<f64>,
}

impl JmaState {
    fn seed(price: f64) -> Self {
        let mut volty = VecDeque::with_capacity(SUM_LENGTH + 2);
        volty.push_back(0.0);
        let mut v_sum = VecDeque::with_capacity(AVG_LENGTH + 1);
        v_sum.push_back(0.0);
        Self {
            ma1: price,
            det0: 0.0,
            det1: 0.0,
            jma: price,
            upper: price,
            lower: price,
            volty,
            v_sum,
        }
    }

    /// Records this bar's volatility and returns the long-run average of the
    /// short volatility sum.
    fn push_volatility(&mut self, volty: f64) -> f64 {
        self.volty.push_back(volty);
        if self.volty.len() > SUM_LENGTH + 1 {
            self.volty.pop_front();
        }
        let oldest = self.volty.front().copied().unwrap_or(0.0);
        let last_sum = self.v_sum.back().copied().unwrap_or(0.0);

        self.v_sum
            .push_back(last_sum + (volty - oldest) / SUM_LENGTH as f64);
        if self.v_sum.len() > AVG_LENGTH {
            self.v_sum.pop_front();
        }
        self.v_sum.iter().sum::<f64>() / self.v_sum.len() as f64
    }
}

/// JMA transition over a single price line.
#[derive(Debug, Clone, Copy)]
pub struct JmaTransition {
    length: usize,
    coef: Coefficients,
}

impl Transition for JmaTransition {
    type Input = f64;
    type State = JmaState;
    type Output = f64;

    fn min_len(&self) -> usize {
        self.length
    }

    fn warmup(&self) -> usize {
        self.length - 1
    }

    fn init(&self, head: &[f64]) -> (JmaState, f64) {
        (JmaState::seed(head[0]), head[0])
    }

    fn step(&self, mut s: JmaState, price: &f64) -> (JmaState, f64) {
        let price = *price;
        if !price.is_finite() {
            let held = s.jma;
            return (s, held);
        }
        let c = &self.coef;

        let del1 = price - s.upper;
        let del2 = price - s.lower;
        let volty = if del1.abs() == del2.abs() {
            0.0
        } else {
            del1.abs().max(del2.abs())
        };

        let avg_volty = s.push_volatility(volty);
        let r_volty = safe_div(volty, avg_volty, 0.0).min(c.volty_cap).max(1.0);
        let pow2 = r_volty.powf(c.pow1);

        let kv = c.bet.powf(pow2.sqrt());
        s.upper = if del1 > 0.0 { price } else { price - kv * del1 };
        s.lower = if del2 < 0.0 { price } else { price - kv * del2 };

        let alpha = c.beta.powf(pow2);
        s.ma1 += (1.0 - alpha) * (price - s.ma1);
        s.det0 = (price - s.ma1) * (1.0 - c.beta) + c.beta * s.det0;
        let ma2 = s.ma1 + c.phase_ratio * s.det0;
        s.det1 = (ma2 - s.jma) * (1.0 - alpha).powi(2) + alpha.powi(2) * s.det1;
        s.jma += s.det1;

        let out = s.jma;
        (s, out)
    }
}

/// JMA output.
#[derive(Debug, Clone, PartialEq)]
pub struct JmaResult {
    /// Smoothed line
    pub jma: Series,
}

impl IntoMultiSeries for JmaResult {
    fn into_series(self) -> Vec<Series> {
        vec![self.jma]
    }
}

/// Jurik Moving Average
///
/// Three-stage adaptive filter: an EMA whose speed tracks relative
/// volatility, a phase-weighted Kalman-style lead and a final Jurik-adaptive
/// stage. A constant input is reproduced exactly.
#[derive(Debug, Clone)]
pub struct Jma {
    /// Normalized parameters
    pub params: JmaParams,
}

impl Jma {
    /// Creates a JMA filter, replacing invalid parameters by defaults.
    #[must_use]
    pub fn new(params: JmaParams) -> Self {
        Self {
            params: params.normalized(),
        }
    }

    /// Creates a JMA over closes with the given length and phase.
    #[must_use]
    pub fn with_length(length: usize, phase: f64) -> Self {
        Self::new(JmaParams {
            length,
            phase,
            ..JmaParams::default()
        })
    }

    /// The per-bar recurrence, for driving the evaluator directly.
    #[must_use]
    pub fn transition(&self) -> JmaTransition {
        JmaTransition {
            length: self.params.length,
            coef: Coefficients::new(self.params.length, self.params.phase),
        }
    }

    /// Computes over a raw price column. Leading missing values are skipped;
    /// later gaps hold the previous output.
    #[must_use]
    pub fn compute_line(&self, prices: &[f64]) -> Series {
        let start = prices
            .iter()
            .position(|p| p.is_finite())
            .unwrap_or(prices.len());
        let rows = engine::evaluate_from(&self.transition(), start, &prices[start..]);
        engine::project(&rows, |v| Some(*v))
    }
}

impl Default for Jma {
    fn default() -> Self {
        Self::new(JmaParams::default())
    }
}

impl MultiOutputIndicator for Jma {
    type Output = JmaResult;

    fn compute_all(&self, candles: &[Candle]) -> Self::Output {
        let prices = self.params.source.column(candles);
        JmaResult {
            jma: self.compute_line(&prices),
        }
    }

    fn name(&self) -> &str {
        "JMA"
    }

    fn label(&self) -> String {
        format!("JMA_{}_{}", self.params.length, self.params.phase)
    }

    fn warmup_periods(&self) -> usize {
        self.params.length - 1
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["jma"]
    }
}
