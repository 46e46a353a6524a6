//! Stateless helper lines feeding the recursive indicators.
//!
//! Every helper takes and returns an aligned [`Series`]. Values before the
//! helper's window is full are `None`; a gap after that point carries the
//! previous output forward.

pub mod ma;
pub mod rolling;
pub mod rsi;

use kairos_types::Series;

pub use ma::MaMode;

/// Converts a raw column into a line, mapping missing (`NaN`/infinite) values to `None`.
#[must_use]
pub fn from_column(values: &[f64]) -> Series {
    values.iter().map(|v| v.is_finite().then_some(*v)).collect()
}

/// Index of the first defined value.
#[must_use]
pub fn first_defined(line: &[Option<f64>]) -> Option<usize> {
    line.iter().position(Option::is_some)
}

/// Elementwise `a - b`, undefined where either side is.
#[must_use]
pub fn difference(a: &[Option<f64>], b: &[Option<f64>]) -> Series {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(x - y),
            _ => None,
        })
        .collect()
}

/// Absolute one-bar change `|line[i] - line[i-1]|`.
#[must_use]
pub fn abs_change(line: &[Option<f64>]) -> Series {
    let mut out = vec![None; line.len()];
    for i in 1..line.len() {
        if let (Some(cur), Some(prev)) = (line[i], line[i - 1]) {
            out[i] = Some((cur - prev).abs());
        }
    }
    out
}
