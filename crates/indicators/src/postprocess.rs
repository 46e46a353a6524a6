//! Offset and fill post-processing, applied strictly after a scan.

use serde::{Deserialize, Serialize};

use kairos_types::Series;

/// How undefined values are replaced after the scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Replace with a constant.
    Value(f64),
    /// Propagate the last defined value forward.
    Forward,
    /// Propagate the next defined value backward.
    Backward,
}

/// Lag and fill applied uniformly to every output of an indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcess {
    /// Positive values lag the series, negative values lead it.
    pub offset: isize,
    /// Optional fill applied after shifting.
    pub fill: Option<FillPolicy>,
}

impl PostProcess {
    /// Shifts by `offset`, then fills.
    #[must_use]
    pub fn apply(&self, series: &[Option<f64>]) -> Series {
        let shifted = shift(series, self.offset);
        match self.fill {
            Some(policy) => fill(&shifted, policy),
            None => shifted,
        }
    }

    /// Returns true when applying would leave the series unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.offset == 0 && self.fill.is_none()
    }
}

/// Shifts the whole series by `offset` positions, back-filling the vacated
/// slots with undefined values. Length is preserved.
#[must_use]
pub fn shift(series: &[Option<f64>], offset: isize) -> Series {
    let len = series.len();
    let lag = offset.unsigned_abs();
    if lag >= len {
        return vec![None; len];
    }

    let mut out = vec![None; len];
    if offset >= 0 {
        out[lag..].copy_from_slice(&series[..len - lag]);
    } else {
        out[..len - lag].copy_from_slice(&series[lag..]);
    }
    out
}

/// Replaces undefined values according to `policy`.
#[must_use]
pub fn fill(series: &[Option<f64>], policy: FillPolicy) -> Series {
    match policy {
        FillPolicy::Value(v) => series.iter().map(|x| Some(x.unwrap_or(v))).collect(),
        FillPolicy::Forward => {
            let mut last = None;
            series
                .iter()
                .map(|x| {
                    if x.is_some() {
                        last = *x;
                    }
                    last
                })
                .collect()
        }
        FillPolicy::Backward => {
            let mut next = None;
            let mut out: Series = series
                .iter()
                .rev()
                .map(|x| {
                    if x.is_some() {
                        next = *x;
                    }
                    next
                })
                .collect();
            out.reverse();
            out
        }
    }
}
