//! Sequential state-machine evaluator.
//!
//! Runs exactly one pass over the input in index order, threading an
//! exclusively owned state through a [`Transition`]. The evaluator does no
//! arithmetic of its own; every numeric rule lives in the transition.

use std::sync::atomic::{AtomicBool, Ordering};

use kairos_types::Series;

use crate::error::IndicatorError;

/// Per-indicator recurrence: initial state plus a per-bar update rule.
pub trait Transition {
    /// Per-bar input record.
    type Input;
    /// Previous-bar quantities carried by the recurrence.
    type State;
    /// Per-bar output record.
    type Output;

    /// Minimum number of bars (counted from the scan start) required before
    /// any output is defined. Shorter inputs yield all-undefined outputs.
    fn min_len(&self) -> usize;

    /// Number of leading bars passed to [`Transition::init`].
    fn seed_len(&self) -> usize {
        1
    }

    /// Outputs at positions `< start + warmup()` are undefined. The state
    /// still advances through them.
    fn warmup(&self) -> usize {
        0
    }

    /// Builds the initial state from the first `seed_len()` bars and returns
    /// it together with the output for the first bar.
    fn init(&self, head: &[Self::Input]) -> (Self::State, Self::Output);

    /// Consumes the previous state and one bar; returns the next state and
    /// that bar's output.
    fn step(&self, state: Self::State, bar: &Self::Input) -> (Self::State, Self::Output);
}

/// Evaluates `t` over every bar.
pub fn evaluate<T: Transition>(t: &T, inputs: &[T::Input]) -> Vec<Option<T::Output>> {
    evaluate_from(t, 0, inputs)
}

/// Evaluates `t` over `inputs`, where `inputs[k]` is the bar at position
/// `start + k`. Positions before `start` are undefined.
///
/// Used when the input is a derived line with its own undefined prefix.
pub fn evaluate_from<T: Transition>(
    t: &T,
    start: usize,
    inputs: &[T::Input],
) -> Vec<Option<T::Output>> {
    scan(t, start, inputs, None).0
}

/// Like [`evaluate_from`], polling `cancel` between bars.
///
/// # Errors
/// Returns [`IndicatorError::Cancelled`] with the first bar left unevaluated.
pub fn evaluate_cancellable<T: Transition>(
    t: &T,
    start: usize,
    inputs: &[T::Input],
    cancel: &AtomicBool,
) -> Result<Vec<Option<T::Output>>, IndicatorError> {
    match scan(t, start, inputs, Some(cancel)) {
        (out, None) => Ok(out),
        (_, Some(at)) => Err(IndicatorError::Cancelled { at }),
    }
}

/// Projects one field out of per-bar outputs into an aligned series.
pub fn project<O, F>(rows: &[Option<O>], f: F) -> Series
where
    F: Fn(&O) -> Option<f64>,
{
    rows.iter().map(|row| row.as_ref().and_then(&f)).collect()
}

fn undefined<O>(len: usize) -> Vec<Option<O>> {
    let mut out = Vec::with_capacity(len);
    out.resize_with(len, || None);
    out
}

fn scan<T: Transition>(
    t: &T,
    start: usize,
    inputs: &[T::Input],
    cancel: Option<&AtomicBool>,
) -> (Vec<Option<T::Output>>, Option<usize>) {
    let len = start + inputs.len();
    let min_len = t.min_len().max(t.seed_len()).max(1);

    if inputs.len() < min_len {
        tracing::debug!(len, start, min_len, "insufficient data, output undefined");
        return (undefined(len), None);
    }

    let warmup = t.warmup();
    let mut out: Vec<Option<T::Output>> = undefined(start);
    out.reserve(inputs.len());

    let (mut state, first) = t.init(&inputs[..t.seed_len()]);
    out.push((warmup == 0).then_some(first));

    for (k, bar) in inputs.iter().enumerate().skip(1) {
        if let Some(flag) = cancel
            && flag.load(Ordering::Relaxed)
        {
            return (out, Some(start + k));
        }
        let (next, value) = t.step(state, bar);
        state = next;
        out.push((k >= warmup).then_some(value));
    }

    (out, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Running sum with a configurable warm-up.
    struct RunningSum {
        warmup: usize,
        min_len: usize,
    }

    impl Transition for RunningSum {
        type Input = f64;
        type State = f64;
        type Output = f64;

        fn min_len(&self) -> usize {
            self.min_len
        }

        fn warmup(&self) -> usize {
            self.warmup
        }

        fn init(&self, head: &[f64]) -> (f64, f64) {
            (head[0], head[0])
        }

        fn step(&self, state: f64, bar: &f64) -> (f64, f64) {
            let next = state + bar;
            (next, next)
        }
    }

    #[test]
    fn test_evaluate_in_order() {
        let t = RunningSum {
            warmup: 0,
            min_len: 1,
        };
        let out = evaluate(&t, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out, vec![Some(1.0), Some(3.0), Some(6.0), Some(10.0)]);
    }

    #[test]
    fn test_warmup_masks_but_state_advances() {
        let t = RunningSum {
            warmup: 2,
            min_len: 1,
        };
        let out = evaluate(&t, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out, vec![None, None, Some(6.0), Some(10.0)]);
    }

    #[test]
    fn test_insufficient_data_is_all_undefined() {
        let t = RunningSum {
            warmup: 0,
            min_len: 5,
        };
        let out = evaluate(&t, &[1.0, 2.0, 3.0]);
        assert_eq!(out, vec![None, None, None]);

        let empty = evaluate(&t, &[]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_evaluate_from_offsets_start() {
        let t = RunningSum {
            warmup: 1,
            min_len: 2,
        };
        let out = evaluate_from(&t, 2, &[1.0, 2.0, 3.0]);
        assert_eq!(out, vec![None, None, None, Some(3.0), Some(6.0)]);

        let short = evaluate_from(&t, 2, &[1.0]);
        assert_eq!(short, vec![None, None, None]);
    }

    #[test]
    fn test_cancellation() {
        let t = RunningSum {
            warmup: 0,
            min_len: 1,
        };
        let cancel = AtomicBool::new(true);
        let err = evaluate_cancellable(&t, 0, &[1.0, 2.0, 3.0], &cancel).unwrap_err();
        assert!(matches!(err, IndicatorError::Cancelled { at: 1 }));

        let go = AtomicBool::new(false);
        let out = evaluate_cancellable(&t, 0, &[1.0, 2.0, 3.0], &go).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_project() {
        let rows = vec![None, Some((1.0, -1.0)), Some((2.0, -2.0))];
        let firsts = project(&rows, |r| Some(r.0));
        let negative_only = project(&rows, |r| (r.1 < -1.5).then_some(r.1));
        assert_eq!(firsts, vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(negative_only, vec![None, None, Some(-2.0)]);
    }
}
