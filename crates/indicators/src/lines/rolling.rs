//! Rolling window extremes.

use std::collections::VecDeque;

use kairos_types::Series;

/// Highest defined value over the last `length` defined values.
#[must_use]
pub fn highest(line: &[Option<f64>], length: usize) -> Series {
    extreme(line, length, f64::max)
}

/// Lowest defined value over the last `length` defined values.
#[must_use]
pub fn lowest(line: &[Option<f64>], length: usize) -> Series {
    extreme(line, length, f64::min)
}

fn extreme(line: &[Option<f64>], length: usize, pick: fn(f64, f64) -> f64) -> Series {
    let mut out = vec![None; line.len()];
    if length == 0 {
        return out;
    }

    let mut window: VecDeque<f64> = VecDeque::with_capacity(length.min(line.len()) + 1);
    let mut last = None;
    for (i, value) in line.iter().enumerate() {
        if let Some(v) = value {
            window.push_back(*v);
            if window.len() > length {
                window.pop_front();
            }
            if window.len() == length {
                last = window.iter().copied().reduce(pick);
            }
        }
        out[i] = last;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_lowest() {
        let line = vec![Some(1.0), Some(3.0), Some(2.0), Some(0.5), Some(4.0)];
        assert_eq!(
            highest(&line, 3),
            vec![None, None, Some(3.0), Some(3.0), Some(4.0)]
        );
        assert_eq!(
            lowest(&line, 3),
            vec![None, None, Some(1.0), Some(0.5), Some(0.5)]
        );
    }

    #[test]
    fn test_gap_carries_previous() {
        let line = vec![Some(1.0), Some(2.0), None, Some(0.0)];
        assert_eq!(highest(&line, 2), vec![None, Some(2.0), Some(2.0), Some(2.0)]);
        assert_eq!(lowest(&line, 2), vec![None, Some(1.0), Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_zero_length_is_undefined() {
        assert_eq!(highest(&[Some(1.0)], 0), vec![None]);
    }

    #[test]
    fn test_window_longer_than_input() {
        let line = vec![Some(1.0), Some(2.0)];
        assert_eq!(highest(&line, 1 << 40), vec![None, None]);
        assert_eq!(lowest(&line, usize::MAX), vec![None, None]);
    }
}
