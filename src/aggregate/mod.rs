//! The interval aggregator: pure functions from an annotated timeline or a
//! numeric series plus a query interval to scalar summaries.
//!
//! Boundary policy: point events use closed bounds (`start <= time <= end`),
//! while labeled spans count only under full containment (`min_time >= start`
//! and `max_time <= end`). A pause that straddles a segment edge is
//! attributed to neither segment.

mod stats;

use crate::error::MetricsError;
use crate::types::{
    LabeledSpan, LayerKind, NumericSeries, PointLayer, QueryInterval, SeriesSummary, SpanLayer,
    Timeline,
};

/// Counts point events of the named layer with `start <= time <= end`.
///
/// An absent layer yields 0. When the layer was verified sorted at
/// construction the scan stops at the first mark past `end`; otherwise
/// every mark is inspected.
pub fn count_points_in_interval(
    timeline: &Timeline,
    layer_name: &str,
    start: f64,
    end: f64,
) -> Result<usize, MetricsError> {
    let interval = QueryInterval::new(start, end)?;
    let Some(layer) = point_layer(timeline, layer_name)? else {
        return Ok(0);
    };

    let mut count = 0;
    for mark in layer.marks() {
        if layer.is_sorted() && mark.time > interval.end() {
            break;
        }
        if interval.contains(mark.time) {
            count += 1;
        }
    }
    Ok(count)
}

/// Counts spans of the named layer whose label equals `label` and which lie
/// fully inside `[start, end]`. An absent layer yields 0.
pub fn count_spans_in_interval(
    timeline: &Timeline,
    layer_name: &str,
    label: &str,
    start: f64,
    end: f64,
) -> Result<usize, MetricsError> {
    let interval = QueryInterval::new(start, end)?;
    let Some(layer) = span_layer(timeline, layer_name)? else {
        return Ok(0);
    };
    Ok(contained_spans(layer, label, interval).count())
}

/// Total duration of the spans selected by the same rule as
/// [`count_spans_in_interval`]; the two share one selection helper and can
/// never disagree on which spans qualify.
pub fn sum_span_durations(
    timeline: &Timeline,
    layer_name: &str,
    label: &str,
    start: f64,
    end: f64,
) -> Result<f64, MetricsError> {
    let interval = QueryInterval::new(start, end)?;
    let Some(layer) = span_layer(timeline, layer_name)? else {
        return Ok(0.0);
    };
    Ok(contained_spans(layer, label, interval)
        .map(LabeledSpan::duration)
        .sum())
}

/// Distributional summary of the samples with `start <= time <= end` and a
/// defined value. An empty filtered set yields [`SeriesSummary::no_data`].
///
/// Quantiles use linear interpolation between order statistics; see
/// `stats::percentile_sorted` for the exact rule.
pub fn summarize_series(
    series: &NumericSeries,
    start: f64,
    end: f64,
) -> Result<SeriesSummary, MetricsError> {
    let interval = QueryInterval::new(start, end)?;
    let mut values: Vec<f64> = series
        .samples()
        .iter()
        .filter(|sample| interval.contains(sample.time))
        .filter_map(|sample| sample.value)
        .filter(|value| value.is_finite())
        .collect();
    Ok(stats::summarize_values(&mut values))
}

fn contained_spans<'a>(
    layer: &'a SpanLayer,
    label: &'a str,
    interval: QueryInterval,
) -> impl Iterator<Item = &'a LabeledSpan> {
    layer
        .spans()
        .iter()
        .filter(move |span| span.label == label && interval.encloses(span.min_time, span.max_time))
}

fn point_layer<'a>(
    timeline: &'a Timeline,
    layer_name: &str,
) -> Result<Option<&'a PointLayer>, MetricsError> {
    match timeline.layer(layer_name) {
        None => Ok(None),
        Some(layer) => match &layer.kind {
            LayerKind::Points(points) => Ok(Some(points)),
            other => Err(MetricsError::layer_type_mismatch(
                &layer.name,
                "points",
                other.describe(),
            )),
        },
    }
}

fn span_layer<'a>(
    timeline: &'a Timeline,
    layer_name: &str,
) -> Result<Option<&'a SpanLayer>, MetricsError> {
    match timeline.layer(layer_name) {
        None => Ok(None),
        Some(layer) => match &layer.kind {
            LayerKind::Spans(spans) => Ok(Some(spans)),
            other => Err(MetricsError::layer_type_mismatch(
                &layer.name,
                "labeled spans",
                other.describe(),
            )),
        },
    }
}
