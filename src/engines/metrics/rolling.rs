// src/engines/metrics/rolling.rs
use crate::types::{MetricValue, UndefinedReason};

use std::ops::Range;

/// Call `f` with the index range of every trailing window over `len` points.
///
/// The output has one entry per point; positions before the first full
/// window are `InsufficientWindow`.
pub fn rolling_ranges<F>(len: usize, window: usize, f: F) -> Vec<MetricValue>
where
    F: Fn(Range<usize>) -> MetricValue,
{
    if window == 0 {
        return vec![MetricValue::Undefined(UndefinedReason::InvalidParameter); len];
    }
    (0..len)
        .map(|end| {
            if end + 1 < window {
                MetricValue::Undefined(UndefinedReason::InsufficientWindow)
            } else {
                f(end + 1 - window..end + 1)
            }
        })
        .collect()
}

/// Apply `f` to every trailing window of `window` values.
pub fn rolling_apply<F>(values: &[f64], window: usize, f: F) -> Vec<MetricValue>
where
    F: Fn(&[f64]) -> MetricValue,
{
    rolling_ranges(values.len(), window, |range| f(&values[range]))
}

/// Rolling reduction of a price series on its return axis.
///
/// Entry `t` covers the `window` returns ending at return `t`, i.e. the
/// `window + 1` prices from `t + 1 - window` to `t + 1`. The output is one
/// shorter than `prices`.
pub fn rolling_prices<F>(prices: &[f64], window: usize, f: F) -> Vec<MetricValue>
where
    F: Fn(&[f64]) -> MetricValue,
{
    let periods = prices.len().saturating_sub(1);
    rolling_ranges(periods, window, |range| f(&prices[range.start..range.end + 1]))
}
