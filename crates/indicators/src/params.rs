//! Parameter normalization.
//!
//! Every indicator resolves its scalar configuration once, before the scan
//! starts. Out-of-range values are replaced by the documented default and the
//! substitution is logged; callers that prefer rejection use
//! [`NormalizeParams::validated`] instead.

use crate::error::IndicatorError;

/// A parameter that was replaced by its default.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Parameter name.
    pub param: &'static str,
    /// Value supplied by the caller.
    pub given: f64,
    /// Default that replaced it.
    pub default: f64,
}

/// Collects default substitutions for one indicator's parameter set.
#[derive(Debug)]
pub struct Normalizer {
    indicator: &'static str,
    strict: bool,
    substitutions: Vec<Substitution>,
}

impl Normalizer {
    /// Creates a normalizer that logs each substitution.
    #[must_use]
    pub fn new(indicator: &'static str) -> Self {
        Self {
            indicator,
            strict: false,
            substitutions: Vec::new(),
        }
    }

    /// Creates a normalizer that only records substitutions; see [`Normalizer::into_result`].
    #[must_use]
    pub fn strict(indicator: &'static str) -> Self {
        Self {
            strict: true,
            ..Self::new(indicator)
        }
    }

    /// Window length: must be `> 0`.
    pub fn length(&mut self, param: &'static str, value: usize, default: usize) -> usize {
        if value > 0 {
            value
        } else {
            self.substitute(param, value as f64, default as f64);
            default
        }
    }

    /// Finite, strictly positive scalar.
    pub fn positive(&mut self, param: &'static str, value: f64, default: f64) -> f64 {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            self.substitute(param, value, default);
            default
        }
    }

    /// Finite scalar in the half-open interval `(lo, hi]`.
    pub fn within(
        &mut self,
        param: &'static str,
        value: f64,
        lo: f64,
        hi: f64,
        default: f64,
    ) -> f64 {
        if value.is_finite() && value > lo && value <= hi {
            value
        } else {
            self.substitute(param, value, default);
            default
        }
    }

    /// Any finite scalar.
    pub fn finite(&mut self, param: &'static str, value: f64, default: f64) -> f64 {
        if value.is_finite() {
            value
        } else {
            self.substitute(param, value, default);
            default
        }
    }

    /// Substitutions recorded so far.
    #[must_use]
    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    /// Fails with the first recorded substitution, if any.
    ///
    /// # Errors
    /// Returns [`IndicatorError::InvalidParams`] naming the rejected parameter.
    pub fn into_result(self) -> Result<(), IndicatorError> {
        match self.substitutions.first() {
            None => Ok(()),
            Some(s) => Err(IndicatorError::invalid_params(format!(
                "{}: {} = {} is out of range (default {})",
                self.indicator, s.param, s.given, s.default
            ))),
        }
    }

    fn substitute(&mut self, param: &'static str, given: f64, default: f64) {
        if !self.strict {
            tracing::warn!(
                indicator = self.indicator,
                param,
                given,
                default,
                "invalid parameter replaced by default"
            );
        }
        self.substitutions.push(Substitution {
            param,
            given,
            default,
        });
    }
}

/// Normalize-or-default behavior shared by every parameter struct.
pub trait NormalizeParams: Sized {
    /// Indicator name used in log records and errors.
    const INDICATOR: &'static str;

    /// Returns a copy with every field resolved through `n`.
    fn normalize_with(&self, n: &mut Normalizer) -> Self;

    /// Replaces invalid values by defaults, logging each substitution.
    #[must_use]
    fn normalized(&self) -> Self {
        let mut n = Normalizer::new(Self::INDICATOR);
        self.normalize_with(&mut n)
    }

    /// Rejects the parameter set instead of substituting defaults.
    ///
    /// # Errors
    /// Returns [`IndicatorError::InvalidParams`] for the first invalid field.
    fn validated(&self) -> Result<Self, IndicatorError> {
        let mut n = Normalizer::strict(Self::INDICATOR);
        let params = self.normalize_with(&mut n);
        n.into_result().map(|()| params)
    }
}
