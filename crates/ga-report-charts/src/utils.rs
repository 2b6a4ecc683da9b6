//! Axis range and date-axis helpers.

use chrono::{Duration, NaiveDate};

/// Smallest and largest finite value, or `None` if there is none
pub fn finite_bounds(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Widen `(min, max)` by `fraction` of its span on both sides.
/// A zero-width range is widened by one unit instead.
pub fn padded_range((min, max): (f64, f64), fraction: f64) -> (f64, f64) {
    let span = max - min;
    if span <= f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = span * fraction;
    (min - pad, max + pad)
}

/// Value range of a bar chart: always includes zero, padded so labels fit
pub fn bar_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = finite_bounds(values).unwrap_or((0.0, 0.0));
    padded_range((lo.min(0.0), hi.max(0.0)), 0.1)
}

/// Days between `origin` and `date`, as an x coordinate
pub fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

/// Tick label for an x coordinate produced by [`day_offset`]
pub fn day_label(origin: NaiveDate, offset: f64) -> String {
    let days = offset.round();
    if (offset - days).abs() > 1e-6 {
        return String::new();
    }
    (origin + Duration::days(days as i64))
        .format("%Y-%m-%d")
        .to_string()
}
