//! Indicator registry for dynamic indicator creation.

use std::collections::HashMap;
use std::sync::Arc;

use kairos_types::Candle;

use crate::error::IndicatorError;
use crate::impl_::{fisher::Fisher, jma::Jma, psar::Psar, qqe::Qqe, stc::Stc};
use crate::params::NormalizeParams;
use crate::traits::{Indicator, IndicatorParams, IndicatorSpec, MultiOutputResult};

/// Factory function type for creating indicators from parameters.
pub type IndicatorFactory =
    Box<dyn Fn(&IndicatorParams) -> Result<Arc<dyn Indicator>, IndicatorError> + Send + Sync>;

/// Registry for indicator factories.
///
/// Resolves an indicator name and its parameters into a ready evaluator once,
/// before any scan. Pre-populated with PSAR, JMA, QQE, STC and FISHERT.
pub struct IndicatorRegistry {
    /// Indicator factories by name.
    factories: HashMap<String, IndicatorFactory>,
}

impl IndicatorRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers an indicator factory.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&IndicatorParams) -> Result<Arc<dyn Indicator>, IndicatorError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Creates an indicator from a specification. Out-of-range parameter
    /// values are replaced by their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::UnknownIndicator`] if the name is not registered
    /// and [`IndicatorError::InvalidParams`] when parameters do not match.
    pub fn create(&self, spec: &IndicatorSpec) -> Result<Arc<dyn Indicator>, IndicatorError> {
        let factory = self
            .factories
            .get(&spec.name)
            .ok_or_else(|| IndicatorError::UnknownIndicator(spec.name.clone()))?;
        factory(&spec.params)
    }

    /// Like [`IndicatorRegistry::create`], but rejects out-of-range parameter
    /// values instead of substituting defaults.
    ///
    /// # Errors
    ///
    /// Additionally returns [`IndicatorError::InvalidParams`] naming the first
    /// rejected parameter.
    pub fn create_strict(
        &self,
        spec: &IndicatorSpec,
    ) -> Result<Arc<dyn Indicator>, IndicatorError> {
        match &spec.params {
            IndicatorParams::Psar(p) => {
                p.validated()?;
            }
            IndicatorParams::Jma(p) => {
                p.validated()?;
            }
            IndicatorParams::Qqe(p) => {
                p.validated()?;
            }
            IndicatorParams::Stc(p) => {
                p.validated()?;
            }
            IndicatorParams::Fisher(p) => {
                p.validated()?;
            }
        }
        self.create(spec)
    }

    /// Creates the indicator, evaluates it and applies the spec's post-processing.
    ///
    /// # Errors
    ///
    /// Same as [`IndicatorRegistry::create`].
    pub fn compute(
        &self,
        spec: &IndicatorSpec,
        candles: &[Candle],
    ) -> Result<MultiOutputResult, IndicatorError> {
        let indicator = self.create(spec)?;
        Ok(indicator.compute(candles).post_process(&spec.post))
    }

    /// Checks if an indicator is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns list of registered indicator names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Creates a registry with all built-in indicators pre-registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register("PSAR", |params| match params {
            IndicatorParams::Psar(p) => Ok(Arc::new(Psar::new(*p))),
            _ => Err(IndicatorError::invalid_params("PSAR requires Psar params")),
        });

        registry.register("JMA", |params| match params {
            IndicatorParams::Jma(p) => Ok(Arc::new(Jma::new(*p))),
            _ => Err(IndicatorError::invalid_params("JMA requires Jma params")),
        });

        registry.register("QQE", |params| match params {
            IndicatorParams::Qqe(p) => Ok(Arc::new(Qqe::new(*p))),
            _ => Err(IndicatorError::invalid_params("QQE requires Qqe params")),
        });

        registry.register("STC", |params| match params {
            IndicatorParams::Stc(p) => Ok(Arc::new(Stc::new(*p))),
            _ => Err(IndicatorError::invalid_params("STC requires Stc params")),
        });

        registry.register("FISHERT", |params| match params {
            IndicatorParams::Fisher(p) => Ok(Arc::new(Fisher::new(*p))),
            _ => Err(IndicatorError::invalid_params(
                "FISHERT requires Fisher params",
            )),
        });

        registry
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_::{
        fisher::FisherParams, jma::JmaParams, psar::PsarParams, stc::StcParams,
    };
    use crate::postprocess::{FillPolicy, PostProcess};

    fn make_candle(close: f64) -> Candle {
        Candle {
            timestamp_ns: 0,
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = IndicatorRegistry::with_defaults();

        for name in ["PSAR", "JMA", "QQE", "STC", "FISHERT"] {
            assert!(registry.contains(name), "{name}");
        }
        assert!(!registry.contains("UNKNOWN"));
        assert_eq!(registry.names().len(), 5);
    }

    #[test]
    fn test_registry_create_jma() {
        let registry = IndicatorRegistry::with_defaults();
        let spec = IndicatorSpec::new(
            "JMA",
            IndicatorParams::Jma(JmaParams {
                length: 10,
                ..JmaParams::default()
            }),
        );

        let indicator = registry.create(&spec).unwrap();
        assert_eq!(indicator.indicator_name(), "JMA");
        assert_eq!(indicator.lookback(), 9);
    }

    #[test]
    fn test_registry_unknown_indicator() {
        let registry = IndicatorRegistry::with_defaults();
        let spec = IndicatorSpec::new("UNKNOWN", IndicatorParams::Psar(PsarParams::default()));

        match registry.create(&spec) {
            Err(IndicatorError::UnknownIndicator(name)) => assert_eq!(name, "UNKNOWN"),
            _ => panic!("Expected UnknownIndicator error"),
        }
    }

    #[test]
    fn test_registry_invalid_params() {
        let registry = IndicatorRegistry::with_defaults();
        let spec = IndicatorSpec::new("PSAR", IndicatorParams::Fisher(FisherParams::default()));

        assert!(matches!(
            registry.create(&spec),
            Err(IndicatorError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_registry_strict_rejects_out_of_range() {
        let registry = IndicatorRegistry::with_defaults();
        let spec = IndicatorSpec::new(
            "STC",
            IndicatorParams::Stc(StcParams {
                factor: 2.0,
                ..StcParams::default()
            }),
        );

        // Lenient creation substitutes the default factor.
        let lenient = registry.create(&spec).unwrap();
        assert_eq!(lenient.indicator_name(), "STC");

        match registry.create_strict(&spec) {
            Err(IndicatorError::InvalidParams(msg)) => assert!(msg.contains("factor")),
            _ => panic!("Expected InvalidParams error"),
        }
    }

    #[test]
    fn test_registry_compute_with_post() {
        let candles: Vec<Candle> = (0..30).map(|i| make_candle(10.0 + f64::from(i))).collect();
        let registry = IndicatorRegistry::with_defaults();
        let spec = IndicatorSpec::new("PSAR", IndicatorParams::Psar(PsarParams::default()))
            .with_post(PostProcess {
                offset: 1,
                fill: Some(FillPolicy::Value(0.0)),
            });

        let result = registry.compute(&spec, &candles).unwrap();

        assert_eq!(result.label, "PSAR_0.02_0.2");
        assert_eq!(
            result.names().collect::<Vec<_>>(),
            vec!["long", "short", "af", "reversal", "sar", "trend"]
        );
        // Bar 0 is undefined, the lag adds one more, both filled with 0.
        assert_eq!(result.get_at("af", 0), Some(0.0));
        assert_eq!(result.get_at("af", 1), Some(0.0));
        assert!(result.get_at("af", 2).unwrap() > 0.0);
        assert!(result.get("sar").unwrap().iter().all(Option::is_some));
    }

    #[test]
    fn test_registry_custom_indicator() {
        let mut registry = IndicatorRegistry::new();

        registry.register("FAST_JMA", |params| match params {
            IndicatorParams::Jma(p) => Ok(Arc::new(Jma::new(JmaParams {
                length: p.length / 2,
                ..*p
            }))),
            _ => Err(IndicatorError::invalid_params("FAST_JMA requires Jma params")),
        });

        let spec = IndicatorSpec::new(
            "FAST_JMA",
            IndicatorParams::Jma(JmaParams {
                length: 20,
                ..JmaParams::default()
            }),
        );
        let indicator = registry.create(&spec).unwrap();

        assert_eq!(indicator.lookback(), 9);
    }
}
