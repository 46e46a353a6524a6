//! Indicator traits and specifications.
//!
//! Defines the core traits and types for indicators.

use serde::{Deserialize, Serialize};

use kairos_types::{Candle, Series};

use crate::error::IndicatorError;
use crate::impl_::{
    fisher::FisherParams, jma::JmaParams, psar::PsarParams, qqe::QqeParams, stc::StcParams,
};
use crate::postprocess::PostProcess;

/// Specification for an indicator: registry name, parameters and post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    /// Indicator name (e.g. "PSAR", "JMA").
    pub name: String,
    /// Parameters for the indicator
    pub params: IndicatorParams,
    /// Offset and fill applied after the scan
    #[serde(default)]
    pub post: PostProcess,
}

impl IndicatorSpec {
    /// Creates a new indicator specification without post-processing.
    #[must_use]
    pub fn new(name: impl Into<String>, params: IndicatorParams) -> Self {
        Self {
            name: name.into(),
            params,
            post: PostProcess::default(),
        }
    }

    /// Attaches post-processing.
    #[must_use]
    pub fn with_post(mut self, post: PostProcess) -> Self {
        self.post = post;
        self
    }

    /// Parses a specification from JSON.
    ///
    /// # Errors
    /// Returns [`IndicatorError::Config`] when the document does not decode.
    pub fn from_json(json: &str) -> Result<Self, IndicatorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Creates a composite key for one output of a multi-output indicator.
    #[must_use]
    pub fn with_output_suffix(&self, output_name: &str) -> String {
        format!("{name}_{output_name}", name = self.name)
    }
}

/// Parameters for indicator configuration, one variant per indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndicatorParams {
    /// Parabolic stop-and-reverse parameters
    Psar(PsarParams),
    /// Jurik moving average parameters
    Jma(JmaParams),
    /// Quantitative qualitative estimation parameters
    Qqe(QqeParams),
    /// Schaff trend cycle parameters
    Stc(StcParams),
    /// Fisher transform parameters
    Fisher(FisherParams),
}

/// Trait for multi-output indicators.
///
/// All indicators compute over the full bar series and return outputs of the
/// same length. Values before the warm-up period are `None`.
pub trait MultiOutputIndicator: Send + Sync {
    /// Type of the output structure
    type Output: IntoMultiSeries;

    /// Computes all outputs at once.
    fn compute_all(&self, candles: &[Candle]) -> Self::Output;

    /// Name of the indicator (e.g. "PSAR").
    fn name(&self) -> &str;

    /// Name including parameters, used as column prefix (e.g. `PSAR_0.02_0.2`).
    fn label(&self) -> String;

    /// Number of leading undefined values in the primary output when the
    /// input is complete.
    fn warmup_periods(&self) -> usize;

    /// List of output names, in [`IntoMultiSeries::into_series`] order.
    fn output_names(&self) -> &'static [&'static str];
}

/// Trait for converting multi-output results into a vector of series.
pub trait IntoMultiSeries {
    /// Converts the output structure into aligned series.
    fn into_series(self) -> Vec<Series>;
}

/// Object-safe view of an indicator, as handed out by the registry.
pub trait Indicator: Send + Sync {
    /// Computes every output, keyed by output name.
    fn compute(&self, candles: &[Candle]) -> MultiOutputResult;

    /// Name of the indicator.
    fn indicator_name(&self) -> &str;

    /// Number of leading undefined values in the primary output.
    fn lookback(&self) -> usize;
}

impl<T: MultiOutputIndicator> Indicator for T {
    fn compute(&self, candles: &[Candle]) -> MultiOutputResult {
        let outputs = self
            .output_names()
            .iter()
            .map(|name| (*name).to_string())
            .zip(self.compute_all(candles).into_series())
            .collect();
        MultiOutputResult {
            label: self.label(),
            outputs,
        }
    }

    fn indicator_name(&self) -> &str {
        self.name()
    }

    fn lookback(&self) -> usize {
        self.warmup_periods()
    }
}

/// Result container for multi-output indicator access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiOutputResult {
    /// Parametrized indicator label
    pub label: String,
    /// Output name and values, in declaration order
    pub outputs: Vec<(String, Series)>,
}

impl MultiOutputResult {
    /// Gets a specific output by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values)
    }

    /// Gets a value at a specific index from an output.
    #[must_use]
    pub fn get_at(&self, name: &str, idx: usize) -> Option<f64> {
        self.get(name).and_then(|v| v.get(idx).copied().flatten())
    }

    /// Output names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|(n, _)| n.as_str())
    }

    /// Column labels (`<label>_<output>`).
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.names()
            .map(|n| format!("{label}_{n}", label = self.label))
            .collect()
    }

    /// Applies the same lag and fill to every output.
    #[must_use]
    pub fn post_process(mut self, post: &PostProcess) -> Self {
        if !post.is_identity() {
            for (_, values) in &mut self.outputs {
                *values = post.apply(values);
            }
        }
        self
    }
}
