//! Kairos Indicators
//!
//! Recursive state-machine indicators over ordered bar series.
//! Every indicator is a single in-order scan that threads an owned state
//! through a per-bar transition function.
//!
//! # Features
//! - Generic sequential evaluator ([`engine::Transition`])
//! - Normalize-or-default parameter handling with logged substitutions
//! - Numeric guards for zero ranges and singular ratios
//! - Offset and fill post-processing
//! - Registry for indicator factories
//!
//! # Available Indicators
//! - PSAR: Parabolic Stop-and-Reverse
//! - JMA: Jurik Moving Average
//! - QQE: Quantitative Qualitative Estimation
//! - STC: Schaff Trend Cycle
//! - FISHERT: Fisher Transform

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod guards;
pub mod impl_;
pub mod lines;
pub mod params;
pub mod postprocess;
pub mod registry;
pub mod traits;

// Re-export main types
pub use engine::{Transition, evaluate, evaluate_cancellable, evaluate_from};
pub use error::IndicatorError;
pub use lines::MaMode;
pub use params::{NormalizeParams, Normalizer, Substitution};
pub use postprocess::{FillPolicy, PostProcess};
pub use registry::IndicatorRegistry;
pub use traits::{
    Indicator, IndicatorParams, IndicatorSpec, IntoMultiSeries, MultiOutputIndicator,
    MultiOutputResult,
};

// Re-export indicator implementations
pub use impl_::{
    Trend,
    fisher::{Fisher, FisherParams, FisherResult},
    jma::{Jma, JmaParams, JmaResult},
    psar::{Psar, PsarParams, PsarResult},
    qqe::{Qqe, QqeParams, QqeResult, qqe_from_lines},
    stc::{Stc, StcParams, StcResult, StcSource},
};
