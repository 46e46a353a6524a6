//! Numeric guards shared by every transition function.
//!
//! Each recurrence resolves its own singular points (zero ranges, zero
//! average volatility) locally through these helpers so that a degenerate
//! bar never turns into an infinite or undefined output.

/// Denominators at or below this magnitude are treated as zero.
pub const EPSILON: f64 = 1e-12;

/// Divides `num` by `den`, returning `fallback` when `den` is (numerically) zero.
#[inline]
#[must_use]
pub fn safe_div(num: f64, den: f64, fallback: f64) -> f64 {
    if den.abs() <= EPSILON {
        fallback
    } else {
        num / den
    }
}

/// Clamps `value` into `[lo, hi]`. `NaN` maps to `lo`.
///
/// Unlike [`f64::clamp`] this never panics; callers pass bounds that are
/// already ordered.
#[inline]
#[must_use]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Raises `value` to at least `floor`.
#[inline]
#[must_use]
pub fn floor_at(value: f64, floor: f64) -> f64 {
    if value < floor { floor } else { value }
}

/// Rounds to a fixed number of decimal places.
#[inline]
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Width of `[low, high]` when it is strictly positive.
#[inline]
#[must_use]
pub fn positive_range(high: f64, low: f64) -> Option<f64> {
    let range = high - low;
    (range > 0.0).then_some(range)
}
