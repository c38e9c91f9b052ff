use std::cmp::Ordering;

use crate::types::SeriesSummary;

/// Value at `fraction` (0.0..=1.0) of a sorted slice, using linear
/// interpolation between order statistics: the rank is
/// `fraction * (len - 1)`, and a fractional rank blends the two adjacent
/// values by its fractional part. The median, q1 and q3 all go through
/// this rule so the reported quartiles stay mutually consistent.
pub(crate) fn percentile_sorted(sorted_values: &[f64], fraction: f64) -> f64 {
    debug_assert!(!sorted_values.is_empty());
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = fraction.clamp(0.0, 1.0);
    let rank = clamped * (sorted_values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

/// Six-field summary of a set of defined values. Empty input yields the
/// no-data summary, never zeros.
pub(crate) fn summarize_values(values: &mut Vec<f64>) -> SeriesSummary {
    if values.is_empty() {
        return SeriesSummary::no_data();
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let q1 = percentile_sorted(values, 0.25);
    let q3 = percentile_sorted(values, 0.75);

    SeriesSummary {
        median: Some(percentile_sorted(values, 0.5)),
        min: values.first().copied(),
        max: values.last().copied(),
        q1: Some(q1),
        q3: Some(q3),
        iqr: Some(q3 - q1),
    }
}
