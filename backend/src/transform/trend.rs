//! Fixed-length trend series per metric.
//!
//! The leading points are real numeric period values; the rest of the line
//! is filled with bounded noise around a base value so every metric renders
//! a full-length sparkline. The synthesized tail is filler, not a forecast.
//!
//! The random source is a parameter so callers (and tests) can seed it.

use rand::Rng;

use crate::models::{PeriodValue, TrendPoint};

/// Points per metric trend line.
pub const TREND_POINTS: usize = 14;

/// Relative amplitude of synthesized points.
pub const VOLATILITY: f64 = 0.05;

/// Base used when the metric has no numeric history at all.
pub const FALLBACK_BASE: f64 = 100.0;

/// Build exactly `count` trend points.
///
/// The last `count` numeric entries of `values` (text and empty entries
/// skipped) become points `0..n` in their original order. Points `n..count`
/// are `base * (1 + U(-VOLATILITY, VOLATILITY))` where `base` is the first
/// numeric entry of that slice, or [`FALLBACK_BASE`].
pub fn build_series<'v, I, R>(values: I, count: usize, rng: &mut R) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'v PeriodValue>,
    R: Rng,
{
    let numeric: Vec<f64> = values.into_iter().filter_map(PeriodValue::as_number).collect();
    let slice = &numeric[numeric.len().saturating_sub(count)..];
    let base = slice.first().copied().unwrap_or(FALLBACK_BASE);

    (0..count)
        .map(|index| {
            let value = match slice.get(index) {
                Some(&v) => v,
                None => base * (1.0 + rng.gen_range(-VOLATILITY..=VOLATILITY)),
            };
            TrendPoint { index, value }
        })
        .collect()
}

/// Replace points with explicitly supplied values, keyed by index.
/// Indices outside the series are ignored.
pub fn apply_overrides(
    series: &mut [TrendPoint],
    overrides: impl IntoIterator<Item = (usize, f64)>,
) {
    for (index, value) in overrides {
        if let Some(point) = series.get_mut(index) {
            point.value = value;
        }
    }
}
