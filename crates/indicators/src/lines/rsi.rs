//! Wilder's Relative Strength Index.

use kairos_types::Series;

use super::ma::rma;
use crate::guards::safe_div;

/// RSI over `prices` with Wilder smoothing.
///
/// ```text
/// RSI = 100 * avg_gain / (avg_gain + avg_loss)
/// ```
///
/// The first defined value sits at index `length` (one change per bar after
/// the first). A window without any movement reads 50.
#[must_use]
pub fn rsi(prices: &[Option<f64>], length: usize) -> Series {
    let len = prices.len();
    let mut gains = vec![None; len];
    let mut losses = vec![None; len];
    for i in 1..len {
        if let (Some(cur), Some(prev)) = (prices[i], prices[i - 1]) {
            let change = cur - prev;
            gains[i] = Some(change.max(0.0));
            losses[i] = Some((-change).max(0.0));
        }
    }

    let avg_gain = rma(&gains, length);
    let avg_loss = rma(&losses, length);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => Some(safe_div(100.0 * g, g + l, 50.0)),
            _ => None,
        })
        .collect()
}
